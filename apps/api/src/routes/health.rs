use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::db::check_db_connection;
use crate::state::AppState;

/// GET /health
/// Liveness plus a live store connectivity probe.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let database = if check_db_connection(&state.db).await {
        "connected"
    } else {
        "disconnected"
    };

    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "database": database,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "name": "Me-API Playground",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "A live, queryable resume/portfolio API",
        "endpoints": {
            "health": "/health",
            "profile": "/profile",
            "projects": "/projects",
            "top_skills": "/skills/top",
            "search": "/search"
        }
    }))
}
