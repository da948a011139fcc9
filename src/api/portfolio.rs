use axum::{extract::State, Json};
use std::sync::Arc;

use crate::db::{
    find_super_admin, Article, Experience, PortfolioOwner, PortfolioResponse, Profile, Project,
    Skill, Social,
};
use crate::AppState;

use super::error::ApiError;

/// Number of recent articles shown on the landing page
const LATEST_ARTICLES: i64 = 3;

/// Public portfolio of the site owner (the SUPER_ADMIN)
pub async fn get_portfolio(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PortfolioResponse>, ApiError> {
    let owner = find_super_admin(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = ?")
        .bind(&owner.id)
        .fetch_optional(&state.db)
        .await?;

    let experiences = sqlx::query_as::<_, Experience>(
        "SELECT * FROM experiences WHERE user_id = ? ORDER BY start_date DESC",
    )
    .bind(&owner.id)
    .fetch_all(&state.db)
    .await?;

    let projects = sqlx::query_as::<_, Project>(
        "SELECT * FROM projects WHERE user_id = ? ORDER BY start_date DESC",
    )
    .bind(&owner.id)
    .fetch_all(&state.db)
    .await?;

    let skills = sqlx::query_as::<_, Skill>(
        "SELECT * FROM skills WHERE user_id = ? ORDER BY category ASC, name ASC",
    )
    .bind(&owner.id)
    .fetch_all(&state.db)
    .await?;

    let socials = sqlx::query_as::<_, Social>(
        "SELECT * FROM socials WHERE user_id = ? ORDER BY created_at ASC",
    )
    .bind(&owner.id)
    .fetch_all(&state.db)
    .await?;

    let articles = sqlx::query_as::<_, Article>(
        "SELECT * FROM articles WHERE user_id = ? AND published = 1 ORDER BY published_at DESC LIMIT ?",
    )
    .bind(&owner.id)
    .bind(LATEST_ARTICLES)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(PortfolioResponse {
        user: PortfolioOwner {
            id: owner.id,
            name: owner.name,
            email: owner.email,
        },
        profile,
        experiences,
        projects: projects.into_iter().map(Project::to_response).collect(),
        skills,
        socials,
        articles,
    }))
}
