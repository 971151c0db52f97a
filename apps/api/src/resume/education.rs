use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::PgExecutor;

use crate::auth::AdminUser;
use crate::errors::AppError;
use crate::models::resume::EducationRow;
use crate::profile::aggregate::{first_profile_id, require_profile_id, touch_profile};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct EducationCreate {
    pub institution: String,
    pub degree: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl EducationCreate {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.institution.trim().is_empty() {
            return Err(AppError::Validation(
                "institution must not be empty".to_string(),
            ));
        }
        if self.degree.trim().is_empty() {
            return Err(AppError::Validation("degree must not be empty".to_string()));
        }
        validate_gpa(self.gpa)
    }
}

fn validate_gpa(gpa: Option<f64>) -> Result<(), AppError> {
    if let Some(gpa) = gpa {
        if !(0.0..=4.0).contains(&gpa) {
            return Err(AppError::Validation(
                "gpa must be between 0.0 and 4.0".to_string(),
            ));
        }
    }
    Ok(())
}

/// Partial update payload. `Option<Option<T>>` distinguishes an absent
/// field (leave unchanged) from an explicit null (clear the column).
#[derive(Debug, Default, Deserialize)]
pub struct EducationPatch {
    pub institution: Option<String>,
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub field: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub start_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub end_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub gpa: Option<Option<f64>>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub description: Option<Option<String>>,
}

impl EducationPatch {
    pub fn apply(self, row: &mut EducationRow) {
        if let Some(v) = self.institution {
            row.institution = v;
        }
        if let Some(v) = self.degree {
            row.degree = v;
        }
        if let Some(v) = self.field {
            row.field = v;
        }
        if let Some(v) = self.start_date {
            row.start_date = v;
        }
        if let Some(v) = self.end_date {
            row.end_date = v;
        }
        if let Some(v) = self.gpa {
            row.gpa = v;
        }
        if let Some(v) = self.description {
            row.description = v;
        }
    }
}

pub async fn list_education(
    ex: impl PgExecutor<'_>,
    profile_id: i32,
) -> Result<Vec<EducationRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM education WHERE profile_id = $1 ORDER BY id")
        .bind(profile_id)
        .fetch_all(ex)
        .await
}

pub async fn insert_education(
    ex: impl PgExecutor<'_>,
    profile_id: i32,
    input: &EducationCreate,
) -> Result<EducationRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO education
            (profile_id, institution, degree, field, start_date, end_date, gpa, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(profile_id)
    .bind(&input.institution)
    .bind(&input.degree)
    .bind(&input.field)
    .bind(&input.start_date)
    .bind(&input.end_date)
    .bind(input.gpa)
    .bind(&input.description)
    .fetch_one(ex)
    .await
}

async fn update_education(
    ex: impl PgExecutor<'_>,
    row: &EducationRow,
) -> Result<EducationRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE education
        SET institution = $2, degree = $3, field = $4, start_date = $5,
            end_date = $6, gpa = $7, description = $8
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(row.id)
    .bind(&row.institution)
    .bind(&row.degree)
    .bind(&row.field)
    .bind(&row.start_date)
    .bind(&row.end_date)
    .bind(row.gpa)
    .bind(&row.description)
    .fetch_one(ex)
    .await
}

/// GET /education
pub async fn handle_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<EducationRow>>, AppError> {
    let rows = match first_profile_id(&state.db).await? {
        Some(profile_id) => list_education(&state.db, profile_id).await?,
        None => Vec::new(),
    };
    Ok(Json(rows))
}

/// POST /education
pub async fn handle_create(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(input): Json<EducationCreate>,
) -> Result<(StatusCode, Json<EducationRow>), AppError> {
    input.validate()?;

    let mut tx = state.db.begin().await?;
    let profile_id = require_profile_id(&mut *tx).await?;
    let row = insert_education(&mut *tx, profile_id, &input).await?;
    touch_profile(&mut *tx, profile_id).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /education/{id}
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _admin: AdminUser,
    Json(patch): Json<EducationPatch>,
) -> Result<Json<EducationRow>, AppError> {
    let mut tx = state.db.begin().await?;

    let mut row: EducationRow = sqlx::query_as("SELECT * FROM education WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Education entry {id} not found")))?;

    patch.apply(&mut row);
    if row.institution.trim().is_empty() || row.degree.trim().is_empty() {
        return Err(AppError::Validation(
            "institution and degree must not be empty".to_string(),
        ));
    }
    validate_gpa(row.gpa)?;

    let updated = update_education(&mut *tx, &row).await?;
    touch_profile(&mut *tx, row.profile_id).await?;
    tx.commit().await?;

    Ok(Json(updated))
}

/// DELETE /education/{id}
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<StatusCode, AppError> {
    let mut tx = state.db.begin().await?;

    let row: Option<EducationRow> = sqlx::query_as("DELETE FROM education WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let row = row.ok_or_else(|| AppError::NotFound(format!("Education entry {id} not found")))?;

    touch_profile(&mut *tx, row.profile_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_row() -> EducationRow {
        EducationRow {
            id: 1,
            profile_id: 1,
            institution: "Stanford University".to_string(),
            degree: "BSc".to_string(),
            field: Some("Computer Science".to_string()),
            start_date: Some("2015-09".to_string()),
            end_date: Some("2019-05".to_string()),
            gpa: Some(3.8),
            description: None,
        }
    }

    #[test]
    fn create_rejects_blank_required_fields() {
        let input = EducationCreate {
            institution: "  ".to_string(),
            degree: "BSc".to_string(),
            field: None,
            start_date: None,
            end_date: None,
            gpa: None,
            description: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn create_rejects_out_of_range_gpa() {
        let mut input = EducationCreate {
            institution: "MIT".to_string(),
            degree: "MSc".to_string(),
            field: None,
            start_date: None,
            end_date: None,
            gpa: Some(4.5),
            description: None,
        };
        assert!(input.validate().is_err());
        input.gpa = Some(-0.1);
        assert!(input.validate().is_err());
        input.gpa = Some(4.0);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn patch_absent_fields_leave_row_unchanged() {
        let mut row = base_row();
        let patch: EducationPatch = serde_json::from_str("{}").unwrap();
        patch.apply(&mut row);
        assert_eq!(row.institution, "Stanford University");
        assert_eq!(row.gpa, Some(3.8));
    }

    #[test]
    fn patch_null_clears_nullable_field() {
        let mut row = base_row();
        let patch: EducationPatch = serde_json::from_str(r#"{"gpa": null}"#).unwrap();
        patch.apply(&mut row);
        assert_eq!(row.gpa, None);
        // other fields untouched
        assert_eq!(row.field.as_deref(), Some("Computer Science"));
    }

    #[test]
    fn patch_value_overwrites_field() {
        let mut row = base_row();
        let patch: EducationPatch =
            serde_json::from_str(r#"{"degree": "PhD", "end_date": "Present"}"#).unwrap();
        patch.apply(&mut row);
        assert_eq!(row.degree, "PhD");
        assert_eq!(row.end_date.as_deref(), Some("Present"));
    }
}
