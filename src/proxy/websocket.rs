//! WebSocket upgrade bridging.

use axum::{
    extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{
    Message as BackendMessage,
    protocol::{CloseFrame as BackendCloseFrame, frame::coding::CloseCode},
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

type BackendStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connect to the backend, then accept the client upgrade and pump frames.
///
/// The backend is dialed first so a dead backend answers `502` instead of
/// an upgrade that immediately closes.
pub async fn bridge(upgrade: WebSocketUpgrade, backend_url: Url) -> Response {
    match tokio_tungstenite::connect_async(backend_url.as_str()).await {
        Ok((backend, _response)) => {
            info!(name: "proxy.ws.bridged", url = %backend_url, "WebSocket bridged");
            upgrade.on_upgrade(move |client| pump(client, backend, backend_url))
        }
        Err(e) => {
            warn!(name: "proxy.ws.failed", url = %backend_url, error = %e, "Backend upgrade failed");
            (StatusCode::BAD_GATEWAY, format!("Proxy error: {e}")).into_response()
        }
    }
}

async fn pump(client: WebSocket, backend: BackendStream, backend_url: Url) {
    let (mut client_tx, mut client_rx) = client.split();
    let (mut backend_tx, mut backend_rx) = backend.split();

    let upstream = async {
        while let Some(Ok(msg)) = client_rx.next().await {
            let Some(msg) = to_backend(msg) else { continue };
            if backend_tx.send(msg).await.is_err() {
                break;
            }
        }
        let _ = backend_tx.close().await;
    };

    let downstream = async {
        while let Some(Ok(msg)) = backend_rx.next().await {
            let Some(msg) = to_client(msg) else { continue };
            if client_tx.send(msg).await.is_err() {
                break;
            }
        }
        let _ = client_tx.close().await;
    };

    tokio::select! {
        () = upstream => debug!(name: "proxy.ws.client_done", url = %backend_url, "Client side finished"),
        () = downstream => debug!(name: "proxy.ws.backend_done", url = %backend_url, "Backend side finished"),
    }

    info!(name: "proxy.ws.closed", url = %backend_url, "WebSocket bridge closed");
}

/// Ping and pong are answered by each side locally and not relayed.
fn to_backend(msg: Message) -> Option<BackendMessage> {
    match msg {
        Message::Text(text) => Some(BackendMessage::text(text.as_str().to_owned())),
        Message::Binary(bytes) => Some(BackendMessage::Binary(bytes)),
        Message::Close(frame) => Some(BackendMessage::Close(frame.map(|f| BackendCloseFrame {
            code: CloseCode::from(f.code),
            reason: f.reason.as_str().to_owned().into(),
        }))),
        Message::Ping(_) | Message::Pong(_) => None,
    }
}

fn to_client(msg: BackendMessage) -> Option<Message> {
    match msg {
        BackendMessage::Text(text) => Some(Message::Text(text.as_str().to_owned().into())),
        BackendMessage::Binary(bytes) => Some(Message::Binary(bytes)),
        BackendMessage::Close(frame) => Some(Message::Close(frame.map(|f| CloseFrame {
            code: f.code.into(),
            reason: f.reason.as_str().to_owned().into(),
        }))),
        BackendMessage::Ping(_) | BackendMessage::Pong(_) | BackendMessage::Frame(_) => None,
    }
}
