//! Request path classification.
//!
//! Matching is exact string equality: no trailing-slash or case folding and no
//! prefix matching for the public allowlist.

/// Paths reachable without a session
pub const PUBLIC_ROUTES: [&str; 8] = [
    "/",
    "/login",
    "/register",
    "/auth/login",
    "/auth/register",
    "/api/auth/login",
    "/api/auth/register",
    "/api/portfolio",
];

/// Public pages that bounce an already-authenticated visitor to the dashboard
pub const GUEST_ONLY_PAGES: [&str; 2] = ["/login", "/register"];

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// How the middleware treats a request path. Computed once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// In the allowlist; no session needed
    Public,
    /// Protected dashboard page; failures redirect to `/login`
    Page,
    /// Protected API route; failures are JSON errors and methods are role-checked
    Api,
}

impl RouteKind {
    pub fn classify(path: &str) -> Self {
        if PUBLIC_ROUTES.contains(&path) {
            RouteKind::Public
        } else if path == "/api" || path.starts_with("/api/") {
            RouteKind::Api
        } else {
            RouteKind::Page
        }
    }
}

/// `/login` and `/register` only
pub fn is_guest_only(path: &str) -> bool {
    GUEST_ONLY_PAGES.contains(&path)
}
