use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::PgExecutor;

use crate::auth::AdminUser;
use crate::errors::AppError;
use crate::models::resume::{SkillRow, SkillWithCount};
use crate::profile::aggregate::{first_profile_id, require_profile_id, touch_profile};
use crate::state::AppState;

pub const SKILL_LEVELS: &[&str] = &["beginner", "intermediate", "advanced", "expert"];

#[derive(Debug, Clone, Deserialize)]
pub struct SkillCreate {
    pub name: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub years_experience: Option<f64>,
}

impl SkillCreate {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }
        validate_level(self.level.as_deref())?;
        validate_years(self.years_experience)
    }
}

fn validate_level(level: Option<&str>) -> Result<(), AppError> {
    if let Some(level) = level {
        if !SKILL_LEVELS.contains(&level) {
            return Err(AppError::Validation(format!(
                "level must be one of: {}",
                SKILL_LEVELS.join(", ")
            )));
        }
    }
    Ok(())
}

fn validate_years(years: Option<f64>) -> Result<(), AppError> {
    if let Some(years) = years {
        if years < 0.0 {
            return Err(AppError::Validation(
                "years_experience must not be negative".to_string(),
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct SkillPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub level: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub years_experience: Option<Option<f64>>,
}

impl SkillPatch {
    pub fn apply(self, row: &mut SkillRow) {
        if let Some(v) = self.name {
            row.name = v;
        }
        if let Some(v) = self.level {
            row.level = v;
        }
        if let Some(v) = self.category {
            row.category = v;
        }
        if let Some(v) = self.years_experience {
            row.years_experience = v;
        }
    }
}

pub async fn list_skills(
    ex: impl PgExecutor<'_>,
    profile_id: i32,
) -> Result<Vec<SkillRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM skills WHERE profile_id = $1 ORDER BY id")
        .bind(profile_id)
        .fetch_all(ex)
        .await
}

pub async fn insert_skill(
    ex: impl PgExecutor<'_>,
    profile_id: i32,
    input: &SkillCreate,
) -> Result<SkillRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO skills (profile_id, name, level, category, years_experience)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(profile_id)
    .bind(&input.name)
    .bind(&input.level)
    .bind(&input.category)
    .bind(input.years_experience)
    .fetch_one(ex)
    .await
}

async fn update_skill(ex: impl PgExecutor<'_>, row: &SkillRow) -> Result<SkillRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE skills
        SET name = $2, level = $3, category = $4, years_experience = $5
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(row.id)
    .bind(&row.name)
    .bind(&row.level)
    .bind(&row.category)
    .bind(row.years_experience)
    .fetch_one(ex)
    .await
}

/// Skills ranked by the number of projects linked through project_skills.
/// LEFT JOIN so zero-project skills rank with count 0; ties break on
/// descending id for a stable order.
pub async fn top_skills(
    ex: impl PgExecutor<'_>,
    limit: i64,
) -> Result<Vec<SkillWithCount>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT s.id, s.name, s.level, s.category, s.years_experience,
               COUNT(ps.project_id) AS project_count
        FROM skills s
        LEFT JOIN project_skills ps ON ps.skill_id = s.id
        GROUP BY s.id
        ORDER BY project_count DESC, s.id DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(ex)
    .await
}

#[derive(Debug, Deserialize)]
pub struct TopSkillsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

pub fn validate_limit(limit: i64) -> Result<(), AppError> {
    if !(1..=50).contains(&limit) {
        return Err(AppError::Validation(
            "limit must be between 1 and 50".to_string(),
        ));
    }
    Ok(())
}

/// GET /skills
pub async fn handle_list(State(state): State<AppState>) -> Result<Json<Vec<SkillRow>>, AppError> {
    let rows = match first_profile_id(&state.db).await? {
        Some(profile_id) => list_skills(&state.db, profile_id).await?,
        None => Vec::new(),
    };
    Ok(Json(rows))
}

/// GET /skills/top?limit=
pub async fn handle_top(
    State(state): State<AppState>,
    Query(params): Query<TopSkillsQuery>,
) -> Result<Json<Vec<SkillWithCount>>, AppError> {
    validate_limit(params.limit)?;
    Ok(Json(top_skills(&state.db, params.limit).await?))
}

/// POST /skills
pub async fn handle_create(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(input): Json<SkillCreate>,
) -> Result<(StatusCode, Json<SkillRow>), AppError> {
    input.validate()?;

    let mut tx = state.db.begin().await?;
    let profile_id = require_profile_id(&mut *tx).await?;
    let row = insert_skill(&mut *tx, profile_id, &input).await?;
    touch_profile(&mut *tx, profile_id).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /skills/{id}
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _admin: AdminUser,
    Json(patch): Json<SkillPatch>,
) -> Result<Json<SkillRow>, AppError> {
    let mut tx = state.db.begin().await?;

    let mut row: SkillRow = sqlx::query_as("SELECT * FROM skills WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Skill {id} not found")))?;

    patch.apply(&mut row);
    if row.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    validate_level(row.level.as_deref())?;
    validate_years(row.years_experience)?;

    let updated = update_skill(&mut *tx, &row).await?;
    touch_profile(&mut *tx, row.profile_id).await?;
    tx.commit().await?;

    Ok(Json(updated))
}

/// DELETE /skills/{id}
/// Join rows referencing this skill go with it via cascade.
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<StatusCode, AppError> {
    let mut tx = state.db.begin().await?;

    let row: Option<SkillRow> = sqlx::query_as("DELETE FROM skills WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let row = row.ok_or_else(|| AppError::NotFound(format!("Skill {id} not found")))?;

    touch_profile(&mut *tx, row.profile_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_level() {
        let input = SkillCreate {
            name: "React".to_string(),
            level: Some("guru".to_string()),
            category: None,
            years_experience: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn accepts_each_known_level() {
        for level in SKILL_LEVELS {
            let input = SkillCreate {
                name: "Go".to_string(),
                level: Some(level.to_string()),
                category: None,
                years_experience: Some(2.5),
            };
            assert!(input.validate().is_ok(), "level {level} should be valid");
        }
    }

    #[test]
    fn rejects_negative_years() {
        let input = SkillCreate {
            name: "Rust".to_string(),
            level: None,
            category: None,
            years_experience: Some(-1.0),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn limit_bounds_are_inclusive() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(50).is_ok());
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(51).is_err());
    }

    #[test]
    fn limit_defaults_to_ten() {
        let q: TopSkillsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.limit, 10);
    }

    #[test]
    fn patch_null_level_clears_it() {
        let mut row = SkillRow {
            id: 1,
            profile_id: 1,
            name: "React".to_string(),
            level: Some("expert".to_string()),
            category: Some("frontend".to_string()),
            years_experience: Some(4.0),
        };
        let patch: SkillPatch = serde_json::from_str(r#"{"level": null}"#).unwrap();
        patch.apply(&mut row);
        assert_eq!(row.level, None);
        assert_eq!(row.category.as_deref(), Some("frontend"));
    }
}
