//! Chat view model.
//!
//! Everything the chat component owns lives here: the connection status,
//! the append-only message list, the input buffer, and the single realtime
//! connection handle.
//!
//! # Structure
//!
//! - [`message`]: Messages and roles
//! - [`status`]: Three-valued connection status
//! - [`connection`]: Transport seam and lifecycle events
//! - [`view`]: The view itself ([`ChatView`]) and its plain state ([`ChatState`])
//!
//! # Example
//!
//! ```rust
//! use demo_support_chat::chat::{ChatView, ConnectionEvent, ConnectionStatus};
//! # use demo_support_chat::chat::Connection;
//! # #[derive(Debug, Default)]
//! # struct Offline;
//! # impl Connection for Offline {
//! #     fn is_open(&self) -> bool { false }
//! #     fn send_text(&mut self, _: &str) -> demo_support_chat::error::Result<()> { Ok(()) }
//! #     fn close(&mut self) {}
//! # }
//!
//! let mut view = ChatView::mount(Offline, None);
//! assert_eq!(view.state().status(), ConnectionStatus::Connecting);
//!
//! view.handle_event(ConnectionEvent::Close);
//! assert_eq!(view.state().status(), ConnectionStatus::Disconnected);
//! ```

pub mod connection;
pub mod message;
pub mod status;
pub mod view;

pub use connection::{Connection, ConnectionEvent, FramePayload};
pub use message::{Message, MessageId, Role};
pub use status::ConnectionStatus;
pub use view::{ChatState, ChatView, DEFAULT_GREETING, NOT_CONNECTED_TEXT, SendOutcome};
