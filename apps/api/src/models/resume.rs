use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EducationRow {
    pub id: i32,
    #[serde(skip_serializing)]
    pub profile_id: i32,
    pub institution: String,
    pub degree: String,
    pub field: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub gpa: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkExperienceRow {
    pub id: i32,
    #[serde(skip_serializing)]
    pub profile_id: i32,
    pub company: String,
    pub position: String,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_current: bool,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: i32,
    #[serde(skip_serializing)]
    pub profile_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub github_url: Option<String>,
    pub demo_url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillRow {
    pub id: i32,
    #[serde(skip_serializing)]
    pub profile_id: i32,
    pub name: String,
    pub level: Option<String>,
    pub category: Option<String>,
    pub years_experience: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SocialLinkRow {
    pub id: i32,
    #[serde(skip_serializing)]
    pub profile_id: i32,
    pub platform: String,
    pub url: String,
    pub icon: Option<String>,
}

/// A project joined with the skills linked to it through project_skills.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectWithSkills {
    #[serde(flatten)]
    pub project: ProjectRow,
    pub skills: Vec<SkillRow>,
}

/// Skill plus number of linked projects, for GET /skills/top.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SkillWithCount {
    pub id: i32,
    pub name: String,
    pub level: Option<String>,
    pub category: Option<String>,
    pub years_experience: Option<f64>,
    pub project_count: i64,
}
