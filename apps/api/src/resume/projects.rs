use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::PgExecutor;

use crate::auth::AdminUser;
use crate::errors::AppError;
use crate::models::resume::{ProjectRow, ProjectWithSkills, SkillRow};
use crate::profile::aggregate::{first_profile_id, require_profile_id, touch_profile};
use crate::state::AppState;

pub const PROJECT_STATUSES: &[&str] = &["completed", "in-progress", "archived"];

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub demo_url: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Skill ids to associate. Ids that do not resolve to a live skill
    /// row are skipped silently, mirroring the aggregate assembler.
    #[serde(default)]
    pub skill_ids: Vec<i32>,
}

impl ProjectCreate {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }
        validate_status(self.status.as_deref())
    }
}

fn validate_status(status: Option<&str>) -> Result<(), AppError> {
    if let Some(status) = status {
        if !PROJECT_STATUSES.contains(&status) {
            return Err(AppError::Validation(format!(
                "status must be one of: {}",
                PROJECT_STATUSES.join(", ")
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub github_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub demo_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub start_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub end_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::resume::double_option")]
    pub status: Option<Option<String>>,
    /// When present, replaces the project's entire link set.
    pub skill_ids: Option<Vec<i32>>,
}

impl ProjectPatch {
    pub fn apply_fields(&self, row: &mut ProjectRow) {
        if let Some(v) = &self.name {
            row.name = v.clone();
        }
        if let Some(v) = &self.description {
            row.description = v.clone();
        }
        if let Some(v) = &self.url {
            row.url = v.clone();
        }
        if let Some(v) = &self.github_url {
            row.github_url = v.clone();
        }
        if let Some(v) = &self.demo_url {
            row.demo_url = v.clone();
        }
        if let Some(v) = &self.start_date {
            row.start_date = v.clone();
        }
        if let Some(v) = &self.end_date {
            row.end_date = v.clone();
        }
        if let Some(v) = &self.status {
            row.status = v.clone();
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    pub skill: Option<String>,
    pub status: Option<String>,
}

/// Lists projects with optional case-insensitive exact skill-name and
/// status filters.
pub async fn list_projects(
    ex: impl PgExecutor<'_>,
    profile_id: i32,
    skill: Option<&str>,
    status: Option<&str>,
) -> Result<Vec<ProjectRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT p.* FROM projects p
        WHERE p.profile_id = $1
          AND ($2::text IS NULL OR p.status = $2)
          AND ($3::text IS NULL OR EXISTS (
                SELECT 1 FROM project_skills ps
                JOIN skills s ON s.id = ps.skill_id
                WHERE ps.project_id = p.id AND lower(s.name) = lower($3)))
        ORDER BY p.id
        "#,
    )
    .bind(profile_id)
    .bind(status)
    .bind(skill)
    .fetch_all(ex)
    .await
}

pub async fn insert_project(
    ex: impl PgExecutor<'_>,
    profile_id: i32,
    input: &ProjectCreate,
) -> Result<ProjectRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO projects
            (profile_id, name, description, url, github_url, demo_url,
             start_date, end_date, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(profile_id)
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.url)
    .bind(&input.github_url)
    .bind(&input.demo_url)
    .bind(&input.start_date)
    .bind(&input.end_date)
    .bind(&input.status)
    .fetch_one(ex)
    .await
}

async fn update_project(
    ex: impl PgExecutor<'_>,
    row: &ProjectRow,
) -> Result<ProjectRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE projects
        SET name = $2, description = $3, url = $4, github_url = $5,
            demo_url = $6, start_date = $7, end_date = $8, status = $9
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(row.id)
    .bind(&row.name)
    .bind(&row.description)
    .bind(&row.url)
    .bind(&row.github_url)
    .bind(&row.demo_url)
    .bind(&row.start_date)
    .bind(&row.end_date)
    .bind(&row.status)
    .fetch_one(ex)
    .await
}

/// Links a project to every requested skill id that resolves to a live
/// skill row. Unknown ids fall out of the subquery; duplicate pairs are
/// absorbed by ON CONFLICT.
pub async fn link_skills(
    ex: impl PgExecutor<'_>,
    project_id: i32,
    skill_ids: &[i32],
) -> Result<(), sqlx::Error> {
    if skill_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r#"
        INSERT INTO project_skills (project_id, skill_id)
        SELECT $1, id FROM skills WHERE id = ANY($2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(project_id)
    .bind(skill_ids)
    .execute(ex)
    .await?;
    Ok(())
}

async fn unlink_all_skills(ex: impl PgExecutor<'_>, project_id: i32) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM project_skills WHERE project_id = $1")
        .bind(project_id)
        .execute(ex)
        .await?;
    Ok(())
}

/// Fetches the linked skills for a batch of projects in one query and
/// zips them together, preserving project order.
pub async fn attach_skills(
    ex: impl PgExecutor<'_>,
    projects: Vec<ProjectRow>,
) -> Result<Vec<ProjectWithSkills>, sqlx::Error> {
    let ids: Vec<i32> = projects.iter().map(|p| p.id).collect();
    let mut by_project: HashMap<i32, Vec<SkillRow>> = HashMap::new();

    if !ids.is_empty() {
        let linked: Vec<(i32, SkillRow)> = sqlx::query_as::<_, LinkedSkillRow>(
            r#"
            SELECT ps.project_id, s.id, s.profile_id, s.name, s.level,
                   s.category, s.years_experience
            FROM project_skills ps
            JOIN skills s ON s.id = ps.skill_id
            WHERE ps.project_id = ANY($1)
            ORDER BY s.id
            "#,
        )
        .bind(&ids)
        .fetch_all(ex)
        .await?
        .into_iter()
        .map(|r| {
            (
                r.project_id,
                SkillRow {
                    id: r.id,
                    profile_id: r.profile_id,
                    name: r.name,
                    level: r.level,
                    category: r.category,
                    years_experience: r.years_experience,
                },
            )
        })
        .collect();

        for (project_id, skill) in linked {
            by_project.entry(project_id).or_default().push(skill);
        }
    }

    Ok(projects
        .into_iter()
        .map(|project| {
            let skills = by_project.remove(&project.id).unwrap_or_default();
            ProjectWithSkills { project, skills }
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct LinkedSkillRow {
    project_id: i32,
    id: i32,
    profile_id: i32,
    name: String,
    level: Option<String>,
    category: Option<String>,
    years_experience: Option<f64>,
}

/// GET /projects?skill=&status=
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<ProjectListQuery>,
) -> Result<Json<Vec<ProjectWithSkills>>, AppError> {
    let rows = match first_profile_id(&state.db).await? {
        Some(profile_id) => {
            list_projects(
                &state.db,
                profile_id,
                params.skill.as_deref(),
                params.status.as_deref(),
            )
            .await?
        }
        None => Vec::new(),
    };
    Ok(Json(attach_skills(&state.db, rows).await?))
}

/// GET /projects/{id}
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProjectWithSkills>, AppError> {
    let row: Option<ProjectRow> = sqlx::query_as("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?;
    let row = row.ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))?;

    let mut with_skills = attach_skills(&state.db, vec![row]).await?;
    Ok(Json(with_skills.remove(0)))
}

/// POST /projects
pub async fn handle_create(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(input): Json<ProjectCreate>,
) -> Result<(StatusCode, Json<ProjectWithSkills>), AppError> {
    input.validate()?;

    let mut tx = state.db.begin().await?;
    let profile_id = require_profile_id(&mut *tx).await?;
    let row = insert_project(&mut *tx, profile_id, &input).await?;
    link_skills(&mut *tx, row.id, &input.skill_ids).await?;
    touch_profile(&mut *tx, profile_id).await?;
    let mut with_skills = attach_skills(&mut *tx, vec![row]).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(with_skills.remove(0))))
}

/// PUT /projects/{id}
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _admin: AdminUser,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<ProjectWithSkills>, AppError> {
    let mut tx = state.db.begin().await?;

    let mut row: ProjectRow = sqlx::query_as("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))?;

    patch.apply_fields(&mut row);
    if row.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    validate_status(row.status.as_deref())?;

    let updated = update_project(&mut *tx, &row).await?;
    if let Some(skill_ids) = &patch.skill_ids {
        unlink_all_skills(&mut *tx, updated.id).await?;
        link_skills(&mut *tx, updated.id, skill_ids).await?;
    }
    touch_profile(&mut *tx, updated.profile_id).await?;
    let mut with_skills = attach_skills(&mut *tx, vec![updated]).await?;
    tx.commit().await?;

    Ok(Json(with_skills.remove(0)))
}

/// DELETE /projects/{id}
/// Cascade clears this project's join rows.
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<StatusCode, AppError> {
    let mut tx = state.db.begin().await?;

    let row: Option<ProjectRow> = sqlx::query_as("DELETE FROM projects WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let row = row.ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))?;

    touch_profile(&mut *tx, row.profile_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_status() {
        let input = ProjectCreate {
            name: "Chat App".to_string(),
            description: None,
            url: None,
            github_url: None,
            demo_url: None,
            start_date: None,
            end_date: None,
            status: Some("paused".to_string()),
            skill_ids: vec![],
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn accepts_each_known_status_and_unset() {
        for status in PROJECT_STATUSES {
            let input = ProjectCreate {
                name: "Chat App".to_string(),
                description: None,
                url: None,
                github_url: None,
                demo_url: None,
                start_date: None,
                end_date: None,
                status: Some(status.to_string()),
                skill_ids: vec![1, 2],
            };
            assert!(input.validate().is_ok(), "status {status} should be valid");
        }
        let unset: ProjectCreate = serde_json::from_str(r#"{"name": "Chat App"}"#).unwrap();
        assert!(unset.validate().is_ok());
        assert!(unset.skill_ids.is_empty());
    }

    #[test]
    fn patch_without_skill_ids_leaves_links_alone() {
        let patch: ProjectPatch = serde_json::from_str(r#"{"name": "Renamed"}"#).unwrap();
        assert!(patch.skill_ids.is_none());
    }

    #[test]
    fn patch_with_empty_skill_ids_replaces_with_nothing() {
        let patch: ProjectPatch = serde_json::from_str(r#"{"skill_ids": []}"#).unwrap();
        assert_eq!(patch.skill_ids, Some(vec![]));
    }

    #[test]
    fn patch_status_null_clears_it() {
        let mut row = ProjectRow {
            id: 1,
            profile_id: 1,
            name: "Chat App".to_string(),
            description: None,
            url: None,
            github_url: None,
            demo_url: None,
            start_date: None,
            end_date: None,
            status: Some("completed".to_string()),
        };
        let patch: ProjectPatch = serde_json::from_str(r#"{"status": null}"#).unwrap();
        patch.apply_fields(&mut row);
        assert_eq!(row.status, None);
    }
}
