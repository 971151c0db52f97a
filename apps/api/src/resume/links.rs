use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::PgExecutor;

use crate::auth::AdminUser;
use crate::errors::AppError;
use crate::models::resume::SocialLinkRow;
use crate::profile::aggregate::{first_profile_id, require_profile_id, touch_profile};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct SocialLinkCreate {
    pub platform: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
}

impl SocialLinkCreate {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.platform.trim().is_empty() {
            return Err(AppError::Validation(
                "platform must not be empty".to_string(),
            ));
        }
        if self.url.trim().is_empty() {
            return Err(AppError::Validation("url must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SocialLinkPatch {
    pub platform: Option<String>,
    pub url: Option<String>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub icon: Option<Option<String>>,
}

impl SocialLinkPatch {
    pub fn apply(self, row: &mut SocialLinkRow) {
        if let Some(v) = self.platform {
            row.platform = v;
        }
        if let Some(v) = self.url {
            row.url = v;
        }
        if let Some(v) = self.icon {
            row.icon = v;
        }
    }
}

pub async fn list_links(
    ex: impl PgExecutor<'_>,
    profile_id: i32,
) -> Result<Vec<SocialLinkRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM social_links WHERE profile_id = $1 ORDER BY id")
        .bind(profile_id)
        .fetch_all(ex)
        .await
}

pub async fn insert_link(
    ex: impl PgExecutor<'_>,
    profile_id: i32,
    input: &SocialLinkCreate,
) -> Result<SocialLinkRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO social_links (profile_id, platform, url, icon)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(profile_id)
    .bind(&input.platform)
    .bind(&input.url)
    .bind(&input.icon)
    .fetch_one(ex)
    .await
}

async fn update_link(
    ex: impl PgExecutor<'_>,
    row: &SocialLinkRow,
) -> Result<SocialLinkRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE social_links
        SET platform = $2, url = $3, icon = $4
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(row.id)
    .bind(&row.platform)
    .bind(&row.url)
    .bind(&row.icon)
    .fetch_one(ex)
    .await
}

/// GET /social-links
pub async fn handle_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<SocialLinkRow>>, AppError> {
    let rows = match first_profile_id(&state.db).await? {
        Some(profile_id) => list_links(&state.db, profile_id).await?,
        None => Vec::new(),
    };
    Ok(Json(rows))
}

/// POST /social-links
pub async fn handle_create(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(input): Json<SocialLinkCreate>,
) -> Result<(StatusCode, Json<SocialLinkRow>), AppError> {
    input.validate()?;

    let mut tx = state.db.begin().await?;
    let profile_id = require_profile_id(&mut *tx).await?;
    let row = insert_link(&mut *tx, profile_id, &input).await?;
    touch_profile(&mut *tx, profile_id).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /social-links/{id}
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _admin: AdminUser,
    Json(patch): Json<SocialLinkPatch>,
) -> Result<Json<SocialLinkRow>, AppError> {
    let mut tx = state.db.begin().await?;

    let mut row: SocialLinkRow = sqlx::query_as("SELECT * FROM social_links WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Social link {id} not found")))?;

    patch.apply(&mut row);
    if row.platform.trim().is_empty() || row.url.trim().is_empty() {
        return Err(AppError::Validation(
            "platform and url must not be empty".to_string(),
        ));
    }

    let updated = update_link(&mut *tx, &row).await?;
    touch_profile(&mut *tx, row.profile_id).await?;
    tx.commit().await?;

    Ok(Json(updated))
}

/// DELETE /social-links/{id}
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<StatusCode, AppError> {
    let mut tx = state.db.begin().await?;

    let row: Option<SocialLinkRow> =
        sqlx::query_as("DELETE FROM social_links WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let row = row.ok_or_else(|| AppError::NotFound(format!("Social link {id} not found")))?;

    touch_profile(&mut *tx, row.profile_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_platform_and_url() {
        let input = SocialLinkCreate {
            platform: "github".to_string(),
            url: " ".to_string(),
            icon: None,
        };
        assert!(input.validate().is_err());

        let input = SocialLinkCreate {
            platform: "github".to_string(),
            url: "https://github.com/janesmith".to_string(),
            icon: None,
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn patch_clears_icon_with_null() {
        let mut row = SocialLinkRow {
            id: 1,
            profile_id: 1,
            platform: "github".to_string(),
            url: "https://github.com/janesmith".to_string(),
            icon: Some("fa-github".to_string()),
        };
        let patch: SocialLinkPatch = serde_json::from_str(r#"{"icon": null}"#).unwrap();
        patch.apply(&mut row);
        assert_eq!(row.icon, None);
    }
}
