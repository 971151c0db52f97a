use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::resume::{
    EducationRow, ProjectWithSkills, SkillRow, SocialLinkRow, WorkExperienceRow,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The full profile aggregate returned by GET /profile: the singleton
/// profile row plus all five child collections, projects carrying
/// their linked skills.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileAggregate {
    #[serde(flatten)]
    pub profile: ProfileRow,
    pub education: Vec<EducationRow>,
    pub work_experience: Vec<WorkExperienceRow>,
    pub projects: Vec<ProjectWithSkills>,
    pub skills: Vec<SkillRow>,
    pub social_links: Vec<SocialLinkRow>,
}
