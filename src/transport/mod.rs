//! Realtime transport for the chat view.
//!
//! - [`websocket`]: [`WsConnection`], a [`Connection`](crate::chat::Connection)
//!   backed by `tokio-tungstenite`
//! - [`session`]: [`ChatSession`], the loop that feeds connection events and
//!   user input to a mounted view

pub mod session;
pub mod websocket;

pub use session::{ChatSession, input_lines};
pub use websocket::{ReadyState, WsConnection, resolve_endpoint, websocket_scheme};
