//! Development proxy.
//!
//! Requests whose path matches a [`ProxyRule`] are sent to the rule's backend
//! instead of the static file service: upgrades are bridged as WebSockets
//! when the rule allows it, everything else is forwarded as plain HTTP.
//!
//! # Structure
//!
//! - [`rule`]: Rules and the ordered [`ProxyTable`]
//! - [`forward`]: HTTP forwarding via `reqwest`
//! - [`websocket`]: Upgrade bridging via `tokio-tungstenite`

pub mod forward;
pub mod rule;
pub mod websocket;

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State, ws::WebSocketUpgrade},
    http::{HeaderMap, StatusCode, header, uri::PathAndQuery},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::error::Result;

pub use rule::{ProxyRule, ProxyTable, default_rules};

/// Shared proxy state.
#[derive(Debug, Clone)]
pub struct ProxyState {
    table: Arc<ProxyTable>,
    client: reqwest::Client,
}

impl ProxyState {
    /// Redirects are relayed to the caller, never followed by the proxy.
    pub fn new(table: ProxyTable) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            table: Arc::new(table),
            client,
        })
    }

    pub fn table(&self) -> &ProxyTable {
        &self.table
    }
}

/// Whether the request asks for a WebSocket upgrade.
pub fn is_websocket_upgrade(headers: &HeaderMap) -> bool {
    headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("websocket"))
}

/// Middleware that diverts matching requests to their backend.
pub async fn proxy_middleware(
    State(state): State<ProxyState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(rule) = state.table.find(req.uri().path()) else {
        return next.run(req).await;
    };

    if !is_websocket_upgrade(req.headers()) {
        return forward::forward(&state.client, rule, req).await;
    }

    if !rule.ws {
        return (
            StatusCode::BAD_REQUEST,
            "WebSocket proxying is not enabled for this path",
        )
            .into_response();
    }

    let (mut parts, _body) = req.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map_or("/", PathAndQuery::as_str)
        .to_owned();

    let backend_url = match rule.websocket_url(&path_and_query) {
        Ok(url) => url,
        Err(e) => {
            warn!(name: "proxy.ws.bad_target", error = %e, "Cannot derive backend URL");
            return (StatusCode::BAD_GATEWAY, e.to_string()).into_response();
        }
    };

    match WebSocketUpgrade::from_request_parts(&mut parts, &state).await {
        Ok(upgrade) => websocket::bridge(upgrade, backend_url).await,
        Err(rejection) => rejection.into_response(),
    }
}
