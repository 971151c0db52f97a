pub mod scoring;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::resume::{ProjectRow, WorkExperienceRow};
use crate::search::scoring::{project_result, sort_by_relevance, work_result, SearchResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /search?q=
/// Case-insensitive substring match over projects and work experience;
/// candidate rows come from the store, scoring happens in
/// [`scoring`]. The full result set is returned, no pagination.
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<SearchResult>>, AppError> {
    let q = params.q.trim();
    if q.is_empty() {
        return Err(AppError::Validation("q must not be empty".to_string()));
    }
    let pattern = format!("%{q}%");

    let projects: Vec<ProjectRow> = sqlx::query_as(
        "SELECT * FROM projects WHERE name ILIKE $1 OR description ILIKE $1 ORDER BY id",
    )
    .bind(&pattern)
    .fetch_all(&state.db)
    .await?;

    let work: Vec<WorkExperienceRow> = sqlx::query_as(
        r#"
        SELECT * FROM work_experience
        WHERE position ILIKE $1 OR description ILIKE $1 OR company ILIKE $1
        ORDER BY id
        "#,
    )
    .bind(&pattern)
    .fetch_all(&state.db)
    .await?;

    let mut results: Vec<SearchResult> = projects.iter().map(|p| project_result(p, q)).collect();
    results.extend(work.iter().map(|w| work_result(w, q)));
    sort_by_relevance(&mut results);

    Ok(Json(results))
}
