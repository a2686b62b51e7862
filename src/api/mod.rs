//! HTTP API: Axum server over the valuation pipeline and the store.
//!
//! JSON in, JSON out. CORS enabled so a browser front end on another
//! origin can call it.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use routes::AppState;

/// Serve the API until Ctrl+C.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind API port {port}"))?;
    info!(port, "API server listening on http://localhost:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received.");
        })
        .await
        .context("API server error")
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(routes::health))
        // Valuation
        .route("/api/valuation", post(routes::post_valuation))
        .route("/api/scenarios/:name", post(routes::post_scenario))
        .route("/api/report", post(routes::post_report))
        .route("/api/extract", post(routes::post_extract))
        .route("/api/cache", get(routes::cache_stats))
        // Companies and history
        .route(
            "/api/companies",
            get(routes::list_companies).post(routes::create_company),
        )
        .route("/api/companies/:id", delete(routes::delete_company))
        .route(
            "/api/companies/:id/valuations",
            get(routes::list_valuations).post(routes::save_valuation),
        )
        .route("/api/valuations/:id", delete(routes::delete_valuation))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
