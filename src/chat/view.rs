//! The chat view: local UI state plus one realtime connection.

use tracing::{debug, warn};

use super::connection::{Connection, ConnectionEvent};
use super::message::Message;
use super::status::ConnectionStatus;

/// Greeting shown before anything is exchanged.
pub const DEFAULT_GREETING: &str = "Hi! Ask me about an order, a refund, or a policy question.";

/// Local reply when a message cannot be forwarded.
pub const NOT_CONNECTED_TEXT: &str = "Not connected yet—try again in a second.";

/// Plain view state, everything a renderer needs.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    status: ConnectionStatus,
    messages: Vec<Message>,
    input: String,
}

impl ChatState {
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Messages in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Mirrors the send button: enabled only when connected with non-blank input.
    pub fn can_submit(&self) -> bool {
        self.status.accepts_input() && !self.input.trim().is_empty()
    }
}

/// What [`ChatView::send`] did with the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input. Nothing changed.
    Ignored,
    /// Appended and transmitted.
    Sent,
    /// Appended, not transmitted; a fallback reply was appended.
    NotConnected,
}

/// A mounted chat component.
///
/// Owns its connection for its whole lifetime and closes it exactly once,
/// either through [`ChatView::unmount`] or when dropped.
#[derive(Debug)]
pub struct ChatView<C: Connection> {
    state: ChatState,
    connection: Option<C>,
}

impl<C: Connection> ChatView<C> {
    /// Mount the view over a connection that is still opening.
    pub fn mount(connection: C, greeting: Option<&str>) -> Self {
        let messages = greeting
            .filter(|g| !g.is_empty())
            .map(Message::assistant)
            .into_iter()
            .collect();

        Self {
            state: ChatState {
                status: ConnectionStatus::Connecting,
                messages,
                input: String::new(),
            },
            connection: Some(connection),
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// Apply one connection lifecycle callback.
    pub fn handle_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Open => {
                self.set_status(ConnectionStatus::Connected);
            }
            ConnectionEvent::Close => {
                self.set_status(ConnectionStatus::Disconnected);
            }
            ConnectionEvent::Error(reason) => {
                warn!(name: "chat.connection.error", reason = %reason, "Connection error");
                self.set_status(ConnectionStatus::Disconnected);
            }
            ConnectionEvent::Frame(payload) => {
                let text = payload.into_text();
                debug!(name: "chat.frame.received", length = text.len(), "Inbound frame");
                self.state.messages.push(Message::assistant(text));
            }
        }
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        if self.state.status != status {
            debug!(
                name: "chat.status.changed",
                from = %self.state.status,
                to = %status,
                "Connection status changed"
            );
        }
        self.state.status = status;
    }

    /// Replace the input buffer.
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.state.input = input.into();
    }

    /// Send the current input buffer.
    pub fn submit(&mut self) -> SendOutcome {
        if self.state.input.trim().is_empty() {
            return SendOutcome::Ignored;
        }
        let input = std::mem::take(&mut self.state.input);
        self.send(&input)
    }

    /// Append `text` as a user message and forward it if the view is connected.
    ///
    /// Forwarding needs both the `Connected` status and an open handle: a
    /// socket whose open callback has not been handled yet still counts as
    /// connecting. Blank text is ignored and leaves the input buffer untouched.
    pub fn send(&mut self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        self.state.messages.push(Message::user(text));
        self.state.input.clear();

        let connected = self.state.status == ConnectionStatus::Connected;
        let transmitted = match self.connection.as_mut() {
            Some(conn) if connected && conn.is_open() => match conn.send_text(text) {
                Ok(()) => true,
                Err(e) => {
                    warn!(name: "chat.send.failed", error = %e, "Failed to forward message");
                    false
                }
            },
            _ => false,
        };

        if transmitted {
            SendOutcome::Sent
        } else {
            self.state.messages.push(Message::assistant(NOT_CONNECTED_TEXT));
            SendOutcome::NotConnected
        }
    }

    /// Tear the view down, releasing the connection.
    pub fn unmount(mut self) -> ChatState {
        self.release();
        std::mem::take(&mut self.state)
    }

    fn release(&mut self) {
        if let Some(mut conn) = self.connection.take() {
            debug!(name: "chat.connection.released", status = %self.state.status, "Releasing connection");
            conn.close();
        }
    }
}

impl<C: Connection> Drop for ChatView<C> {
    fn drop(&mut self) {
        self.release();
    }
}
