use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::error::Result;
use crate::proxy::{self, ProxyState, ProxyTable, forward::MAX_BODY_BYTES};

/// Build the dev server: static files behind the proxy middleware.
pub fn router(config: &AppConfig) -> Result<Router> {
    let state = ProxyState::new(ProxyTable::new(config.proxy.rules.clone()))?;

    let app = Router::new()
        .fallback_service(ServeDir::new(&config.server.static_dir))
        .layer(middleware::from_fn_with_state(
            state,
            proxy::proxy_middleware,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

/// Serve `app` on an already bound listener.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app.into_make_service()).await
}

/// Start the dev server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    for rule in &config.proxy.rules {
        info!(
            name: "proxy.rule.loaded",
            prefix = %rule.prefix,
            target = %rule.target,
            ws = rule.ws,
            "Proxy rule loaded"
        );
    }

    let app = router(&config)?;

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        static_dir = %config.server.static_dir.display(),
        "Server started"
    );

    serve(listener, app).await?;
    Ok(())
}
