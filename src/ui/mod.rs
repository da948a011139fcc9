//! Server-rendered page shells.
//!
//! Each page is a small HTML document that mounts the client bundle served
//! from `/assets`. Access control for these paths lives in the auth
//! middleware, not here.

use axum::{
    extract::Path,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::auth::{end_session, route::LOGIN_PATH};
use crate::AppState;

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public
        .route("/", get(home))
        .route("/login", get(login_page))
        .route("/register", get(register_page))
        .route("/auth/login", get(login_page))
        .route("/auth/register", get(register_page))
        // Protected
        .route("/dashboard", get(dashboard))
        .route("/dashboard/*section", get(dashboard_section))
        .route("/logout", get(logout))
}

/// Minimal document mounting the client bundle on `page`
fn shell(title: &str, page: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="icon" href="/favicon.ico">
<link rel="stylesheet" href="/assets/app.css">
</head>
<body>
<div id="root" data-page="{page}"></div>
<script type="module" src="/assets/app.js"></script>
</body>
</html>
"#,
        title = escape(title),
        page = escape(page),
    ))
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

async fn home() -> Html<String> {
    shell("Portfolio", "home")
}

async fn login_page() -> Html<String> {
    shell("Login", "login")
}

async fn register_page() -> Html<String> {
    shell("Register", "register")
}

async fn dashboard() -> Html<String> {
    shell("Dashboard", "dashboard")
}

async fn dashboard_section(Path(section): Path<String>) -> Html<String> {
    let page = format!("dashboard/{}", section.trim_end_matches('/'));
    shell("Dashboard", &page)
}

/// Logout link for every role. The API logout is a POST, which STAFF may not send.
async fn logout(jar: CookieJar) -> Response {
    (end_session(jar), Redirect::temporary(LOGIN_PATH)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_escapes_page_name() {
        let Html(body) = shell("Dashboard", "dashboard/\"><script>");
        assert!(body.contains("data-page=\"dashboard/&quot;&gt;&lt;script&gt;\""));
        assert!(body.contains("<title>Dashboard</title>"));
    }
}
