use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::PgExecutor;

use crate::auth::AdminUser;
use crate::errors::AppError;
use crate::models::resume::WorkExperienceRow;
use crate::profile::aggregate::{first_profile_id, require_profile_id, touch_profile};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct WorkExperienceCreate {
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub location: Option<String>,
}

impl WorkExperienceCreate {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.company.trim().is_empty() {
            return Err(AppError::Validation("company must not be empty".to_string()));
        }
        if self.position.trim().is_empty() {
            return Err(AppError::Validation(
                "position must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkExperiencePatch {
    pub company: Option<String>,
    pub position: Option<String>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub start_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub end_date: Option<Option<String>>,
    pub is_current: Option<bool>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub location: Option<Option<String>>,
}

impl WorkExperiencePatch {
    pub fn apply(self, row: &mut WorkExperienceRow) {
        if let Some(v) = self.company {
            row.company = v;
        }
        if let Some(v) = self.position {
            row.position = v;
        }
        if let Some(v) = self.description {
            row.description = v;
        }
        if let Some(v) = self.start_date {
            row.start_date = v;
        }
        if let Some(v) = self.end_date {
            row.end_date = v;
        }
        if let Some(v) = self.is_current {
            row.is_current = v;
        }
        if let Some(v) = self.location {
            row.location = v;
        }
    }
}

pub async fn list_work(
    ex: impl PgExecutor<'_>,
    profile_id: i32,
) -> Result<Vec<WorkExperienceRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM work_experience WHERE profile_id = $1 ORDER BY id")
        .bind(profile_id)
        .fetch_all(ex)
        .await
}

pub async fn insert_work(
    ex: impl PgExecutor<'_>,
    profile_id: i32,
    input: &WorkExperienceCreate,
) -> Result<WorkExperienceRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO work_experience
            (profile_id, company, position, description, start_date, end_date, is_current, location)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(profile_id)
    .bind(&input.company)
    .bind(&input.position)
    .bind(&input.description)
    .bind(&input.start_date)
    .bind(&input.end_date)
    .bind(input.is_current)
    .bind(&input.location)
    .fetch_one(ex)
    .await
}

async fn update_work(
    ex: impl PgExecutor<'_>,
    row: &WorkExperienceRow,
) -> Result<WorkExperienceRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE work_experience
        SET company = $2, position = $3, description = $4, start_date = $5,
            end_date = $6, is_current = $7, location = $8
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(row.id)
    .bind(&row.company)
    .bind(&row.position)
    .bind(&row.description)
    .bind(&row.start_date)
    .bind(&row.end_date)
    .bind(row.is_current)
    .bind(&row.location)
    .fetch_one(ex)
    .await
}

/// GET /work-experience
pub async fn handle_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<WorkExperienceRow>>, AppError> {
    let rows = match first_profile_id(&state.db).await? {
        Some(profile_id) => list_work(&state.db, profile_id).await?,
        None => Vec::new(),
    };
    Ok(Json(rows))
}

/// POST /work-experience
pub async fn handle_create(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(input): Json<WorkExperienceCreate>,
) -> Result<(StatusCode, Json<WorkExperienceRow>), AppError> {
    input.validate()?;

    let mut tx = state.db.begin().await?;
    let profile_id = require_profile_id(&mut *tx).await?;
    let row = insert_work(&mut *tx, profile_id, &input).await?;
    touch_profile(&mut *tx, profile_id).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /work-experience/{id}
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _admin: AdminUser,
    Json(patch): Json<WorkExperiencePatch>,
) -> Result<Json<WorkExperienceRow>, AppError> {
    let mut tx = state.db.begin().await?;

    let mut row: WorkExperienceRow = sqlx::query_as("SELECT * FROM work_experience WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Work experience {id} not found")))?;

    patch.apply(&mut row);
    if row.company.trim().is_empty() || row.position.trim().is_empty() {
        return Err(AppError::Validation(
            "company and position must not be empty".to_string(),
        ));
    }

    let updated = update_work(&mut *tx, &row).await?;
    touch_profile(&mut *tx, row.profile_id).await?;
    tx.commit().await?;

    Ok(Json(updated))
}

/// DELETE /work-experience/{id}
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<StatusCode, AppError> {
    let mut tx = state.db.begin().await?;

    let row: Option<WorkExperienceRow> =
        sqlx::query_as("DELETE FROM work_experience WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let row = row.ok_or_else(|| AppError::NotFound(format!("Work experience {id} not found")))?;

    touch_profile(&mut *tx, row.profile_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_company_and_position() {
        let input = WorkExperienceCreate {
            company: "Stripe".to_string(),
            position: "".to_string(),
            description: None,
            start_date: None,
            end_date: None,
            is_current: false,
            location: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn is_current_defaults_to_false() {
        let input: WorkExperienceCreate =
            serde_json::from_str(r#"{"company": "Meta", "position": "Engineer"}"#).unwrap();
        assert!(!input.is_current);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn patch_toggles_is_current_without_touching_dates() {
        let mut row = WorkExperienceRow {
            id: 1,
            profile_id: 1,
            company: "Meta".to_string(),
            position: "Engineer".to_string(),
            description: None,
            start_date: Some("2021-03".to_string()),
            end_date: Some("Present".to_string()),
            is_current: true,
            location: None,
        };
        let patch: WorkExperiencePatch =
            serde_json::from_str(r#"{"is_current": false}"#).unwrap();
        patch.apply(&mut row);
        assert!(!row.is_current);
        assert_eq!(row.end_date.as_deref(), Some("Present"));
    }
}
