//! Shared fixtures: a tiny backend and a dev server bound to port 0.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::{
    Router,
    extract::{
        RawQuery,
        ws::{Message, WebSocketUpgrade},
    },
    response::{IntoResponse, Redirect},
    routing::{get, post},
};
use tokio::net::TcpListener;
use url::Url;

use demo_support_chat::config::{
    AppConfig, BackendConfig, ChatConfig, LogConfig, LogFormat, ProxyConfig, ServerConfig,
};
use demo_support_chat::proxy::ProxyRule;
use demo_support_chat::{backend, server};

pub const TIMEOUT: Duration = Duration::from_secs(5);

async fn echo_ws(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|mut socket| async move {
        while let Some(Ok(msg)) = socket.recv().await {
            match msg {
                Message::Text(text) => {
                    let reply = format!("echo: {}", text.as_str());
                    if socket.send(Message::Text(reply.into())).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    })
}

async fn health(RawQuery(query): RawQuery) -> String {
    format!("ok:{}", query.unwrap_or_default())
}

async fn echo_body(body: String) -> String {
    body
}

async fn moved() -> Redirect {
    Redirect::temporary("/api/new")
}

/// Backend standing in for the process behind the proxy.
pub async fn spawn_backend() -> SocketAddr {
    let app = Router::new()
        .route("/ws", get(echo_ws))
        .route("/api/health", get(health))
        .route("/api/echo", post(echo_body))
        .route("/api/old", get(moved))
        .route("/api/new", get(|| async { "followed" }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// The demo backend on port 0.
pub async fn spawn_demo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, backend::router()).await.unwrap();
    });
    addr
}

/// An address nothing listens on.
pub fn dead_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

pub fn rule(prefix: &str, backend: SocketAddr, ws: bool) -> ProxyRule {
    ProxyRule::new(
        prefix,
        Url::parse(&format!("http://{backend}")).unwrap(),
        ws,
    )
}

pub fn test_config(rules: Vec<ProxyRule>, static_dir: &Path) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            static_dir: static_dir.to_path_buf(),
        },
        backend: BackendConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        proxy: ProxyConfig { rules },
        chat: ChatConfig {
            endpoint: "/ws".to_string(),
            url: None,
            greeting: None,
        },
        log: LogConfig {
            format: LogFormat::Pretty,
        },
    }
}

/// Dev server with the given rules.
pub async fn spawn_dev_server(config: &AppConfig) -> SocketAddr {
    let app = server::router(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        server::serve(listener, app).await.unwrap();
    });
    addr
}
