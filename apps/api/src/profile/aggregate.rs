//! Aggregate assembler: converts nested profile documents into store
//! mutations. Skills are always flushed before projects so each project's
//! skill-id list resolves against live skill rows; ids that do not
//! resolve are dropped silently.

use sqlx::{PgExecutor, PgPool};
use tracing::info;

use crate::errors::AppError;
use crate::models::profile::{ProfileAggregate, ProfileRow};
use crate::profile::payload::{ProfileCreate, ProfileUpdate};
use crate::resume::education::{insert_education, list_education};
use crate::resume::links::{insert_link, list_links};
use crate::resume::projects::{attach_skills, insert_project, link_skills, list_projects};
use crate::resume::skills::{insert_skill, list_skills};
use crate::resume::work::{insert_work, list_work};

/// Returns the singleton profile row, if one exists.
pub async fn first_profile(ex: impl PgExecutor<'_>) -> Result<Option<ProfileRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM profiles ORDER BY id LIMIT 1")
        .fetch_optional(ex)
        .await
}

pub async fn first_profile_id(ex: impl PgExecutor<'_>) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM profiles ORDER BY id LIMIT 1")
        .fetch_optional(ex)
        .await
}

/// Like [`first_profile_id`] but turns an empty store into `NotFound`.
/// Child mutation endpoints call this before writing.
pub async fn require_profile_id(ex: impl PgExecutor<'_>) -> Result<i32, AppError> {
    first_profile_id(ex)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

/// Stamps updated_at on the profile. Every successful mutation of the
/// aggregate or a child collection runs through here.
pub async fn touch_profile(ex: impl PgExecutor<'_>, profile_id: i32) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE profiles SET updated_at = now() WHERE id = $1")
        .bind(profile_id)
        .execute(ex)
        .await?;
    Ok(())
}

/// Loads the full aggregate for GET /profile and write responses.
pub async fn load_aggregate(pool: &PgPool) -> Result<ProfileAggregate, AppError> {
    let profile = first_profile(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    let education = list_education(pool, profile.id).await?;
    let work_experience = list_work(pool, profile.id).await?;
    let skills = list_skills(pool, profile.id).await?;
    let social_links = list_links(pool, profile.id).await?;
    let project_rows = list_projects(pool, profile.id, None, None).await?;
    let projects = attach_skills(pool, project_rows).await?;

    Ok(ProfileAggregate {
        profile,
        education,
        work_experience,
        projects,
        skills,
        social_links,
    })
}

/// Creates the singleton profile with all supplied children in one
/// transaction. Fails with Conflict if a profile already exists.
pub async fn create_aggregate(
    pool: &PgPool,
    input: &ProfileCreate,
) -> Result<ProfileAggregate, AppError> {
    let mut tx = pool.begin().await?;

    // Application-level singleton: checked inside the same transaction
    // as the insert rather than with a schema trick.
    if first_profile_id(&mut *tx).await?.is_some() {
        return Err(AppError::Conflict("Profile already exists".to_string()));
    }

    let profile: ProfileRow = sqlx::query_as(
        r#"
        INSERT INTO profiles (name, email, phone, location, bio)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.location)
    .bind(&input.bio)
    .fetch_one(&mut *tx)
    .await?;

    for edu in &input.education {
        insert_education(&mut *tx, profile.id, edu).await?;
    }
    for work in &input.work_experience {
        insert_work(&mut *tx, profile.id, work).await?;
    }
    // Skills before projects: project skill_ids resolve against rows
    // that exist at link time.
    for skill in &input.skills {
        insert_skill(&mut *tx, profile.id, skill).await?;
    }
    for project in &input.projects {
        let row = insert_project(&mut *tx, profile.id, project).await?;
        link_skills(&mut *tx, row.id, &project.skill_ids).await?;
    }
    for link in &input.social_links {
        insert_link(&mut *tx, profile.id, link).await?;
    }

    tx.commit().await?;
    info!("Created profile {} ({})", profile.id, profile.email);

    load_aggregate(pool).await
}

/// Full-replace update: scalar fields overwrite unconditionally, each
/// supplied child list replaces that collection wholesale (absent lists
/// are left untouched). One transaction.
pub async fn replace_aggregate(
    pool: &PgPool,
    input: &ProfileUpdate,
) -> Result<ProfileAggregate, AppError> {
    let mut tx = pool.begin().await?;

    let profile_id = require_profile_id(&mut *tx).await?;

    sqlx::query(
        r#"
        UPDATE profiles
        SET name = $2, email = $3, phone = $4, location = $5, bio = $6,
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(profile_id)
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.location)
    .bind(&input.bio)
    .execute(&mut *tx)
    .await?;

    if let Some(education) = &input.education {
        sqlx::query("DELETE FROM education WHERE profile_id = $1")
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;
        for edu in education {
            insert_education(&mut *tx, profile_id, edu).await?;
        }
    }

    if let Some(work_experience) = &input.work_experience {
        sqlx::query("DELETE FROM work_experience WHERE profile_id = $1")
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;
        for work in work_experience {
            insert_work(&mut *tx, profile_id, work).await?;
        }
    }

    // Replacing skills cascades away the old join rows; the new skill
    // rows must be in place before any supplied projects link to them.
    if let Some(skills) = &input.skills {
        sqlx::query("DELETE FROM skills WHERE profile_id = $1")
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;
        for skill in skills {
            insert_skill(&mut *tx, profile_id, skill).await?;
        }
    }

    if let Some(projects) = &input.projects {
        sqlx::query("DELETE FROM projects WHERE profile_id = $1")
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;
        for project in projects {
            let row = insert_project(&mut *tx, profile_id, project).await?;
            link_skills(&mut *tx, row.id, &project.skill_ids).await?;
        }
    }

    if let Some(social_links) = &input.social_links {
        sqlx::query("DELETE FROM social_links WHERE profile_id = $1")
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;
        for link in social_links {
            insert_link(&mut *tx, profile_id, link).await?;
        }
    }

    tx.commit().await?;
    info!("Replaced profile {profile_id}");

    load_aggregate(pool).await
}

/// Deletes the profile; cascades clear all child rows and join rows.
pub async fn delete_profile(pool: &PgPool) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let profile_id = require_profile_id(&mut *tx).await?;
    sqlx::query("DELETE FROM profiles WHERE id = $1")
        .bind(profile_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!("Deleted profile {profile_id} and all children");
    Ok(())
}
