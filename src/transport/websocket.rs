//! WebSocket-backed realtime connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::chat::{Connection, ConnectionEvent, FramePayload};
use crate::error::{Error, Result};

/// Socket ready states, matching the browser `readyState` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReadyState {
    Connecting = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
}

impl ReadyState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// Switch an `http`/`https` URL to `ws`/`wss`. WebSocket URLs pass through.
pub fn websocket_scheme(url: &mut Url) -> Result<()> {
    let scheme = match url.scheme() {
        "ws" | "wss" => return Ok(()),
        "http" => "ws",
        "https" => "wss",
        other => return Err(Error::UnsupportedScheme(other.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|()| Error::UnsupportedScheme(url.scheme().to_string()))
}

/// Resolve a chat endpoint against a page origin, the way a browser resolves
/// `new WebSocket("/ws")`.
pub fn resolve_endpoint(origin: &Url, endpoint: &str) -> Result<Url> {
    let mut url = origin.join(endpoint)?;
    websocket_scheme(&mut url)?;
    Ok(url)
}

/// Handle to one WebSocket, driven by a background task.
///
/// Lifecycle callbacks arrive on the receiver returned by [`WsConnection::open`].
#[derive(Debug)]
pub struct WsConnection {
    url: Url,
    ready_state: Arc<AtomicU8>,
    outgoing: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

impl WsConnection {
    /// Start connecting. Must be called within a tokio runtime.
    pub fn open(url: Url) -> (Self, mpsc::UnboundedReceiver<ConnectionEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let ready_state = Arc::new(AtomicU8::new(ReadyState::Connecting as u8));
        let cancel = CancellationToken::new();

        tokio::spawn(drive(
            url.clone(),
            Arc::clone(&ready_state),
            outgoing_rx,
            event_tx,
            cancel.clone(),
        ));

        let conn = Self {
            url,
            ready_state,
            outgoing: outgoing_tx,
            cancel,
        };
        (conn, event_rx)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn ready_state(&self) -> ReadyState {
        ReadyState::from_u8(self.ready_state.load(Ordering::SeqCst))
    }
}

impl Connection for WsConnection {
    fn is_open(&self) -> bool {
        self.ready_state() == ReadyState::Open
    }

    fn send_text(&mut self, text: &str) -> Result<()> {
        if !self.is_open() {
            return Err(Error::NotConnected);
        }
        self.outgoing
            .send(text.to_owned())
            .map_err(|_closed| Error::NotConnected)
    }

    fn close(&mut self) {
        let state = self.ready_state();
        if matches!(state, ReadyState::Connecting | ReadyState::Open) {
            self.ready_state
                .store(ReadyState::Closing as u8, Ordering::SeqCst);
        }
        self.cancel.cancel();
    }
}

impl Drop for WsConnection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn drive(
    url: Url,
    ready_state: Arc<AtomicU8>,
    mut outgoing: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<ConnectionEvent>,
    cancel: CancellationToken,
) {
    info!(name: "chat.connection.opening", url = %url, "Opening realtime connection");

    let handshake = tokio::select! {
        () = cancel.cancelled() => {
            debug!(name: "chat.connection.cancelled", "Closed before handshake completed");
            ready_state.store(ReadyState::Closed as u8, Ordering::SeqCst);
            return;
        }
        result = tokio_tungstenite::connect_async(url.as_str()) => result,
    };

    let stream = match handshake {
        Ok((stream, response)) => {
            info!(
                name: "chat.connection.open",
                url = %url,
                status = %response.status(),
                "Realtime connection open"
            );
            stream
        }
        Err(e) => {
            warn!(name: "chat.connection.failed", url = %url, error = %e, "Handshake failed");
            ready_state.store(ReadyState::Closed as u8, Ordering::SeqCst);
            let _ = events.send(ConnectionEvent::Error(e.to_string()));
            let _ = events.send(ConnectionEvent::Close);
            return;
        }
    };

    let (mut sink, mut source) = stream.split();

    // close() may have raced the handshake
    let opened = ready_state
        .compare_exchange(
            ReadyState::Connecting as u8,
            ReadyState::Open as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        )
        .is_ok();
    if opened {
        let _ = events.send(ConnectionEvent::Open);
    }

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                let _ = sink.send(WsMessage::Close(None)).await;
                let _ = sink.close().await;
                break;
            }
            Some(text) = outgoing.recv() => {
                if let Err(e) = sink.send(WsMessage::text(text)).await {
                    warn!(name: "chat.connection.write_failed", error = %e, "Write failed");
                    let _ = events.send(ConnectionEvent::Error(e.to_string()));
                    break;
                }
            }
            frame = source.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    let payload = FramePayload::Text(text.as_str().to_owned());
                    let _ = events.send(ConnectionEvent::Frame(payload));
                }
                Some(Ok(WsMessage::Binary(bytes))) => {
                    let payload = if bytes.is_empty() {
                        FramePayload::Empty
                    } else {
                        FramePayload::Binary(bytes.to_vec())
                    };
                    let _ = events.send(ConnectionEvent::Frame(payload));
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    debug!(name: "chat.connection.remote_close", frame = ?frame, "Remote closed");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(name: "chat.connection.read_failed", error = %e, "Read failed");
                    let _ = events.send(ConnectionEvent::Error(e.to_string()));
                    break;
                }
                None => break,
            },
        }
    }

    ready_state.store(ReadyState::Closed as u8, Ordering::SeqCst);
    let _ = events.send(ConnectionEvent::Close);
    info!(name: "chat.connection.closed", url = %url, "Realtime connection closed");
}
