//! Demo backend.
//!
//! The process the default proxy rule points at: a `/ws` endpoint that
//! answers greetings and farewells with canned replies. Anything else gets
//! no reply.

use std::sync::Arc;

use axum::{
    Router,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::Response,
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::AppConfig;

pub const GREETING_REPLY: &str = "Hey, What can I help you with today?";
pub const FAREWELL_REPLY: &str = "Goodbye, hopefully I helped you today!";

/// Canned answer for one inbound message.
///
/// A greeting or farewell must be a whole line of the trimmed message;
/// greetings win when both appear.
pub fn reply(message: &str) -> Option<&'static str> {
    let lines: Vec<&str> = message.trim().lines().collect();
    if lines.iter().any(|l| matches!(*l, "hi" | "hello")) {
        Some(GREETING_REPLY)
    } else if lines.contains(&"bye") {
        Some(FAREWELL_REPLY)
    } else {
        None
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/ws", get(chat_socket))
        .layer(TraceLayer::new_for_http())
}

async fn chat_socket(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(converse)
}

async fn converse(mut socket: WebSocket) {
    debug!(name: "backend.socket.open", "Chat socket open");

    while let Some(frame) = socket.recv().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!(name: "backend.socket.read_failed", error = %e, "Read failed");
                break;
            }
        };

        let Some(answer) = reply(text.as_str()) else {
            debug!(name: "backend.message.unanswered", length = text.len(), "No canned reply");
            continue;
        };
        if socket
            .send(Message::Text(answer.to_owned().into()))
            .await
            .is_err()
        {
            break;
        }
    }

    debug!(name: "backend.socket.closed", "Chat socket closed");
}

/// Start the demo backend with the provided configuration.
pub async fn start_backend(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let addr = config.backend_address();
    let listener = TcpListener::bind(&addr).await?;

    info!(name: "backend.started", address = %addr, "Backend started");

    axum::serve(listener, router().into_make_service()).await?;
    Ok(())
}
