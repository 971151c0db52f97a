use axum::{extract::State, http::StatusCode, Json};

use crate::auth::AdminUser;
use crate::errors::AppError;
use crate::models::profile::ProfileAggregate;
use crate::profile::aggregate::{create_aggregate, delete_profile, load_aggregate, replace_aggregate};
use crate::profile::payload::{ProfileCreate, ProfileUpdate};
use crate::state::AppState;

/// GET /profile
pub async fn handle_get(State(state): State<AppState>) -> Result<Json<ProfileAggregate>, AppError> {
    Ok(Json(load_aggregate(&state.db).await?))
}

/// POST /profile
pub async fn handle_create(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(input): Json<ProfileCreate>,
) -> Result<(StatusCode, Json<ProfileAggregate>), AppError> {
    input.validate()?;
    let aggregate = create_aggregate(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(aggregate)))
}

/// PUT /profile
pub async fn handle_update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(input): Json<ProfileUpdate>,
) -> Result<Json<ProfileAggregate>, AppError> {
    input.validate()?;
    Ok(Json(replace_aggregate(&state.db, &input).await?))
}

/// DELETE /profile
pub async fn handle_delete(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<StatusCode, AppError> {
    delete_profile(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}
