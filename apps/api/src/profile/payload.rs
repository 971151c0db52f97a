use serde::Deserialize;

use crate::errors::AppError;
use crate::resume::education::EducationCreate;
use crate::resume::links::SocialLinkCreate;
use crate::resume::projects::ProjectCreate;
use crate::resume::skills::SkillCreate;
use crate::resume::work::WorkExperienceCreate;

/// Nested input for POST /profile. Missing child lists default to empty.
#[derive(Debug, Deserialize)]
pub struct ProfileCreate {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub education: Vec<EducationCreate>,
    #[serde(default)]
    pub work_experience: Vec<WorkExperienceCreate>,
    #[serde(default)]
    pub projects: Vec<ProjectCreate>,
    #[serde(default)]
    pub skills: Vec<SkillCreate>,
    #[serde(default)]
    pub social_links: Vec<SocialLinkCreate>,
}

impl ProfileCreate {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_scalars(&self.name, &self.email)?;
        for edu in &self.education {
            edu.validate()?;
        }
        for work in &self.work_experience {
            work.validate()?;
        }
        for project in &self.projects {
            project.validate()?;
        }
        for skill in &self.skills {
            skill.validate()?;
        }
        for link in &self.social_links {
            link.validate()?;
        }
        Ok(())
    }
}

/// Nested input for PUT /profile. Scalar fields always overwrite; a child
/// list that is absent leaves that collection untouched, while a present
/// list (even empty) replaces the collection wholesale.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    pub education: Option<Vec<EducationCreate>>,
    pub work_experience: Option<Vec<WorkExperienceCreate>>,
    pub projects: Option<Vec<ProjectCreate>>,
    pub skills: Option<Vec<SkillCreate>>,
    pub social_links: Option<Vec<SocialLinkCreate>>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_scalars(&self.name, &self.email)?;
        for edu in self.education.iter().flatten() {
            edu.validate()?;
        }
        for work in self.work_experience.iter().flatten() {
            work.validate()?;
        }
        for project in self.projects.iter().flatten() {
            project.validate()?;
        }
        for skill in self.skills.iter().flatten() {
            skill.validate()?;
        }
        for link in self.social_links.iter().flatten() {
            link.validate()?;
        }
        Ok(())
    }
}

fn validate_scalars(name: &str, email: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    if !is_valid_email(email) {
        return Err(AppError::Validation(
            "email must be a valid address".to_string(),
        ));
    }
    Ok(())
}

/// Minimal shape check: one '@' with a non-empty local part and a domain
/// containing a dot.
fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("jane.smith@gmail.com"));
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jane@"));
        assert!(!is_valid_email("jane@nodot"));
        assert!(!is_valid_email("jane@.com"));
    }

    #[test]
    fn create_child_lists_default_to_empty() {
        let input: ProfileCreate =
            serde_json::from_str(r#"{"name": "Jane", "email": "jane@example.com"}"#).unwrap();
        assert!(input.education.is_empty());
        assert!(input.projects.is_empty());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn update_distinguishes_absent_from_empty_list() {
        let absent: ProfileUpdate =
            serde_json::from_str(r#"{"name": "Jane", "email": "jane@example.com"}"#).unwrap();
        assert!(absent.skills.is_none());

        let empty: ProfileUpdate = serde_json::from_str(
            r#"{"name": "Jane", "email": "jane@example.com", "skills": []}"#,
        )
        .unwrap();
        assert_eq!(empty.skills.as_ref().map(Vec::len), Some(0));
    }

    #[test]
    fn nested_child_validation_propagates() {
        let input: ProfileCreate = serde_json::from_str(
            r#"{
                "name": "Jane",
                "email": "jane@example.com",
                "skills": [{"name": "Go", "level": "wizard"}]
            }"#,
        )
        .unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn blank_name_rejected() {
        let input: ProfileCreate =
            serde_json::from_str(r#"{"name": " ", "email": "jane@example.com"}"#).unwrap();
        assert!(input.validate().is_err());
    }
}
