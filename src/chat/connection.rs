//! The seam between the view and whatever carries its frames.

use crate::error::Result;

/// A realtime, bidirectional text channel owned by one view.
///
/// Lifecycle notifications travel separately as [`ConnectionEvent`]s so the
/// view can process them one at a time.
pub trait Connection {
    /// Whether the handshake completed and the channel is not closing.
    fn is_open(&self) -> bool;

    /// Transmit one raw text frame.
    fn send_text(&mut self, text: &str) -> Result<()>;

    /// Release the channel. Must tolerate being called in any state.
    fn close(&mut self);
}

/// Lifecycle callbacks delivered to the view in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Handshake completed.
    Open,
    /// Inbound frame.
    Frame(FramePayload),
    /// Channel closed, by either side.
    Close,
    /// Transport failure.
    Error(String),
}

/// Payload of an inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramePayload {
    Text(String),
    Binary(Vec<u8>),
    Empty,
}

impl FramePayload {
    /// Decode as display text. Missing payloads become the empty string.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Self::Empty => String::new(),
        }
    }
}
