//! Relevance scoring for cross-entity search. Base score 1.0 for any
//! match; +0.5 when the query appears in the title-bearing field
//! (project name, work position), so title hits outrank
//! description-only hits.

use serde::Serialize;

use crate::models::resume::{ProjectRow, WorkExperienceRow};

pub const BASE_SCORE: f64 = 1.0;
pub const TITLE_BONUS: f64 = 0.5;

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub relevance_score: f64,
}

pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn project_result(project: &ProjectRow, q: &str) -> SearchResult {
    let mut score = BASE_SCORE;
    if contains_ci(&project.name, q) {
        score += TITLE_BONUS;
    }
    SearchResult {
        kind: "project",
        id: project.id,
        title: project.name.clone(),
        description: project.description.clone(),
        relevance_score: score,
    }
}

pub fn work_result(work: &WorkExperienceRow, q: &str) -> SearchResult {
    let mut score = BASE_SCORE;
    if contains_ci(&work.position, q) {
        score += TITLE_BONUS;
    }
    SearchResult {
        kind: "work_experience",
        id: work.id,
        title: format!("{} at {}", work.position, work.company),
        description: work.description.clone(),
        relevance_score: score,
    }
}

/// Descending by score. The sort is stable, so ties keep insertion
/// order: projects before work experience, each in id order.
pub fn sort_by_relevance(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: i32, name: &str, description: Option<&str>) -> ProjectRow {
        ProjectRow {
            id,
            profile_id: 1,
            name: name.to_string(),
            description: description.map(str::to_string),
            url: None,
            github_url: None,
            demo_url: None,
            start_date: None,
            end_date: None,
            status: None,
        }
    }

    fn work(id: i32, position: &str, company: &str, description: Option<&str>) -> WorkExperienceRow {
        WorkExperienceRow {
            id,
            profile_id: 1,
            company: company.to_string(),
            position: position.to_string(),
            description: description.map(str::to_string),
            start_date: None,
            end_date: None,
            is_current: false,
            location: None,
        }
    }

    #[test]
    fn title_match_scores_one_point_five() {
        let result = project_result(&project(1, "Chat App", None), "chat");
        assert_eq!(result.relevance_score, 1.5);

        let result = work_result(&work(2, "Chat Engineer", "Acme", None), "chat");
        assert_eq!(result.relevance_score, 1.5);
        assert_eq!(result.title, "Chat Engineer at Acme");
    }

    #[test]
    fn description_only_match_scores_one() {
        let result = project_result(&project(1, "Sidecar", Some("a chat backend")), "chat");
        assert_eq!(result.relevance_score, 1.0);

        // company-only match on work experience is also description-tier
        let result = work_result(&work(2, "Engineer", "ChatCo", None), "chat");
        assert_eq!(result.relevance_score, 1.0);
    }

    #[test]
    fn match_is_case_insensitive() {
        assert!(contains_ci("Chat App", "CHAT"));
        assert!(contains_ci("CHAT APP", "chat"));
        assert!(!contains_ci("Mail App", "chat"));
    }

    #[test]
    fn sorted_non_increasing_with_projects_first_on_ties() {
        let mut results = vec![
            project_result(&project(1, "Sidecar", Some("chat backend")), "chat"),
            project_result(&project(2, "Chat App", None), "chat"),
            work_result(&work(3, "Engineer", "ChatCo", None), "chat"),
            work_result(&work(4, "Chat Engineer", "Acme", None), "chat"),
        ];
        sort_by_relevance(&mut results);

        let scores: Vec<f64> = results.iter().map(|r| r.relevance_score).collect();
        assert_eq!(scores, vec![1.5, 1.5, 1.0, 1.0]);
        // stable sort: among the 1.5s the project precedes the work hit,
        // among the 1.0s likewise
        assert_eq!(results[0].kind, "project");
        assert_eq!(results[1].kind, "work_experience");
        assert_eq!(results[2].kind, "project");
        assert_eq!(results[3].kind, "work_experience");
    }

    #[test]
    fn type_field_serializes_as_type() {
        let result = project_result(&project(1, "Chat App", None), "chat");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "project");
        assert_eq!(json["relevance_score"], 1.5);
    }
}
