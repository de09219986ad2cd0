//! Error types shared by the chat client and the dev proxy.

use thiserror::Error;

/// Crate error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// WebSocket handshake or transport failure.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// HTTP request to a proxy target failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O failure (listener, terminal).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL scheme has no WebSocket counterpart.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// The realtime connection is not open.
    #[error("Connection is not open")]
    NotConnected,
}

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;
