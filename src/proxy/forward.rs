//! Plain HTTP forwarding.

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Request},
    http::{HeaderMap, StatusCode, header, uri::PathAndQuery},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::rule::ProxyRule;

/// Largest request body forwarded to a backend (10 MiB).
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Connection-level headers that must not cross the proxy.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Forward `req` to the rule's target and relay the response.
///
/// The body is buffered under the router's `DefaultBodyLimit`
/// ([`MAX_BODY_BYTES`]): oversized bodies get `413`, unreadable ones `400`.
pub async fn forward(client: &reqwest::Client, rule: &ProxyRule, req: Request) -> Response {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map_or("/", PathAndQuery::as_str);
    let url = rule.target_url(path_and_query);
    let method = req.method().clone();
    let mut headers = req.headers().clone();

    let body = match Bytes::from_request(req, &()).await {
        Ok(bytes) => bytes,
        Err(rejection) => {
            warn!(
                name: "proxy.http.body_rejected",
                url = %url,
                status = %rejection.status(),
                error = %rejection.body_text(),
                "Request body rejected"
            );
            return rejection.into_response();
        }
    };

    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);

    debug!(name: "proxy.http.forward", method = %method, url = %url, "Forwarding request");

    let upstream = client
        .request(method, url.clone())
        .headers(headers)
        .body(body)
        .send()
        .await;

    match upstream {
        Ok(resp) => {
            let status = resp.status();
            let mut headers = resp.headers().clone();
            strip_hop_by_hop(&mut headers);

            let mut response = Response::new(Body::from_stream(resp.bytes_stream()));
            *response.status_mut() = status;
            *response.headers_mut() = headers;
            response
        }
        Err(e) => {
            warn!(name: "proxy.http.failed", url = %url, error = %e, "Backend unreachable");
            (StatusCode::BAD_GATEWAY, format!("Proxy error: {e}")).into_response()
        }
    }
}
