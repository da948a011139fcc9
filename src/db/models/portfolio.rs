use serde::Serialize;

use super::{Article, Experience, Profile, ProjectResponse, Skill, Social};

#[derive(Debug, Serialize)]
pub struct PortfolioOwner {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
}

/// Everything the public landing page renders, in one response
#[derive(Debug, Serialize)]
pub struct PortfolioResponse {
    pub user: PortfolioOwner,
    pub profile: Option<Profile>,
    pub experiences: Vec<Experience>,
    pub projects: Vec<ProjectResponse>,
    pub skills: Vec<Skill>,
    pub socials: Vec<Social>,
    pub articles: Vec<Article>,
}
