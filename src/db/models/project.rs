//! Project models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
    pub github_url: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    /// JSON-encoded list of technology names
    pub technologies: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Project {
    pub fn to_response(self) -> ProjectResponse {
        let technologies = parse_technologies(&self.technologies);
        ProjectResponse {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            image: self.image,
            link: self.link,
            github_url: self.github_url,
            start_date: self.start_date,
            end_date: self.end_date,
            technologies,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Project as returned by the API, with technologies decoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
    pub github_url: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub technologies: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Text fields of a project form; the image arrives as a separate upload
#[derive(Debug, Default)]
pub struct ProjectFields {
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub github_url: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub technologies: Vec<String>,
}

/// Helper to parse technologies JSON from database
pub fn parse_technologies(json: &str) -> Vec<String> {
    serde_json::from_str(json).unwrap_or_default()
}

/// Accept either a JSON array or a comma-separated list from a form field
pub fn split_technologies(raw: &str) -> Vec<String> {
    if let Ok(list) = serde_json::from_str::<Vec<String>>(raw) {
        return list
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
    }
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_technologies_json_and_csv() {
        assert_eq!(split_technologies(r#"["Rust", " Axum "]"#), vec!["Rust", "Axum"]);
        assert_eq!(split_technologies("Rust, SQLite,,"), vec!["Rust", "SQLite"]);
        assert!(split_technologies("").is_empty());
    }

    #[test]
    fn test_parse_technologies_tolerates_garbage() {
        assert_eq!(parse_technologies(r#"["MQTT"]"#), vec!["MQTT"]);
        assert!(parse_technologies("not json").is_empty());
    }
}
