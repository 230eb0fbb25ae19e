//! Axum router configuration with middleware.
//!
//! Middleware: CORS, tracing.
//!
//! The ordering page is served from `server.web_dir` (default `web/`).
//! API routes take priority; unknown paths fall through to `index.html`.
//! If the directory does not exist, only the API is served.

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.server.allowed_origin.as_deref());
    let web_dir = state.config.server.web_dir.clone();

    let api_routes = Router::new()
        .route("/status", get(handlers::status::get_status))
        .route("/order", post(handlers::order::submit_order));

    let mut router = Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_handler))
        .route("/health", get(handlers::status::health_check));

    if std::path::Path::new(&web_dir).exists() {
        let index_path = format!("{web_dir}/index.html");
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir, "Static page serving enabled");
    } else {
        tracing::warn!(path = %web_dir, "Web directory not found; serving API only");
    }

    // Layers wrap only what is already registered, fallback included.
    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// One allowed origin when configured, otherwise any origin.
fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let origin = match allowed_origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(err)) => {
            tracing::warn!(error = %err, "Invalid allowed origin; allowing any origin");
            AllowOrigin::any()
        }
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
