mod articles;
pub mod auth;
mod contact;
mod experiences;
pub mod error;
mod messages;
mod portfolio;
mod profile;
mod projects;
mod settings;
mod skills;
mod socials;
mod upload;
mod user;
pub mod validation;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::auth::authorize;
use crate::storage::DEFAULT_MAX_BYTES;
use crate::AppState;

use error::ApiError;

/// Request body cap; leaves room for form fields next to a full-size upload
const BODY_LIMIT: usize = DEFAULT_MAX_BYTES + 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Login and register are on the public allowlist; logout is not
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout));

    let api_routes = Router::new()
        // Account
        .route(
            "/user",
            get(user::get_user)
                .put(user::update_user)
                .delete(user::delete_user),
        )
        .route("/user/change-password", post(user::change_password))
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        // Portfolio content
        .route(
            "/profile",
            get(profile::get_profile)
                .put(profile::update_profile)
                .delete(profile::delete_profile),
        )
        .route(
            "/experiences",
            get(experiences::list_experiences).post(experiences::create_experience),
        )
        .route(
            "/experiences/:id",
            put(experiences::update_experience).delete(experiences::delete_experience),
        )
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/:id",
            put(projects::update_project).delete(projects::delete_project),
        )
        .route("/skills", get(skills::list_skills).post(skills::create_skill))
        .route(
            "/skills/:id",
            put(skills::update_skill).delete(skills::delete_skill),
        )
        .route(
            "/socials",
            get(socials::list_socials).post(socials::create_social),
        )
        .route(
            "/socials/:id",
            put(socials::update_social).delete(socials::delete_social),
        )
        .route(
            "/articles",
            get(articles::list_articles).post(articles::create_article),
        )
        .route(
            "/articles/:id",
            put(articles::update_article).delete(articles::delete_article),
        )
        .route("/articles/slug/:slug", get(articles::get_article_by_slug))
        // Contact inbox
        .route("/contact", post(contact::send_message))
        .route("/messages", get(messages::list_messages))
        .route("/messages/:id", put(messages::update_message))
        // Public landing page data
        .route("/portfolio", get(portfolio::get_portfolio));

    // Everything here runs behind the auth middleware, unmatched paths included
    let app_routes = Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", api_routes)
        .merge(crate::ui::create_router())
        .nest_service("/uploads", ServeDir::new(&state.config.server.upload_dir))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(middleware::from_fn_with_state(state.clone(), authorize));

    // Static assets bypass the middleware
    let static_dir = &state.config.server.static_dir;

    Router::new()
        .route("/health", get(health_check))
        .nest_service("/assets", ServeDir::new(static_dir.join("assets")))
        .route_service("/favicon.ico", ServeFile::new(static_dir.join("favicon.ico")))
        .merge(app_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}
