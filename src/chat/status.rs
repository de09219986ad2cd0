//! Connection status shown in the chat header.

use std::fmt;

/// Status of the realtime connection as seen by the view.
///
/// Only connection lifecycle callbacks change it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Handshake in progress.
    #[default]
    Connecting,
    /// Open acknowledgment received.
    Connected,
    /// Closed or failed. Terminal for this view: there is no reconnect.
    Disconnected,
}

impl ConnectionStatus {
    /// Header label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting…",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }

    /// Input placeholder text.
    #[must_use]
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Connected => "Type a message…",
            Self::Connecting | Self::Disconnected => "Connecting…",
        }
    }

    /// Whether the input field is enabled.
    #[must_use]
    pub fn accepts_input(self) -> bool {
        self == Self::Connected
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::Connecting);
        assert_eq!(ConnectionStatus::Connected.to_string(), "Connected");
        assert_eq!(ConnectionStatus::Connecting.label(), "Connecting…");
        assert_eq!(ConnectionStatus::Disconnected.label(), "Disconnected");
    }

    #[test]
    fn test_only_connected_accepts_input() {
        assert!(ConnectionStatus::Connected.accepts_input());
        assert!(!ConnectionStatus::Connecting.accepts_input());
        assert!(!ConnectionStatus::Disconnected.accepts_input());
        assert_eq!(ConnectionStatus::Disconnected.placeholder(), "Connecting…");
    }
}
