mod auth;
mod config;
mod db;
mod errors;
mod models;
mod profile;
mod resume;
mod routes;
mod search;
mod state;

use anyhow::Result;
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::net::SocketAddr;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, init_schema};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Me-API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and create tables on first run
    let db = create_pool(&config.database_url).await?;
    init_schema(&db).await?;

    let cors = build_cors_layer(&config.allowed_origins);

    let state = AppState {
        db,
        config: config.clone(),
    };

    let app = build_router(state)
        .fallback(not_found_fallback)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_fallback))
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the CORS layer from ALLOWED_ORIGINS; "*" anywhere in the list
/// means permissive.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let list: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(list))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Unmatched routes get the same JSON envelope as handler errors.
async fn not_found_fallback() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": {
                "code": "NOT_FOUND",
                "message": "The requested resource was not found"
            }
        })),
    )
}

/// Last-resort handler: a panic anywhere in a request becomes a generic
/// 500 instead of a dropped connection or a leaked backtrace.
fn panic_fallback(_err: Box<dyn std::any::Any + Send + 'static>) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": {
                "code": "INTERNAL_ERROR",
                "message": "An unexpected error occurred. Please try again later."
            }
        })),
    )
        .into_response()
}
