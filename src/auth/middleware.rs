//! Authorization middleware.
//!
//! Runs on every routed request. Per request:
//! 1. classify the path once into a [`RouteKind`]
//! 2. public paths pass (the guest-only pages bounce valid sessions to `/dashboard`)
//! 3. protected paths need a `token` cookie that verifies
//! 4. API paths additionally need the role to allow the HTTP method
//! 5. on success the identity goes downstream as `x-user-id` / `x-user-role`
//!
//! Pages fail with a redirect to `/login`, API routes with a JSON error.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap, HeaderValue, Method, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::route::{is_guest_only, RouteKind, DASHBOARD_PATH, LOGIN_PATH};
use super::session::token_from_headers;
use super::token::{Claims, TokenService};
use super::Role;
use crate::api::error::ApiError;
use crate::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Why the middleware refused a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No session cookie
    #[error("Not authenticated")]
    Unauthenticated,
    /// Cookie present but the token failed verification
    #[error("Invalid token")]
    InvalidToken,
    /// Valid identity, but the role may not use this method
    #[error("Unauthorized")]
    Unauthorized,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated | AuthError::InvalidToken => {
                ApiError::unauthorized(err.to_string())
            }
            AuthError::Unauthorized => ApiError::forbidden(err.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// Outcome of evaluating one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Forward to the handler, with the verified identity when there is one
    Allow(Option<Claims>),
    /// Temporary redirect to the given path
    Redirect(&'static str),
    /// JSON error response
    Deny(AuthError),
}

/// Decide what to do with a request. Pure apart from the clock used for
/// token expiry.
pub fn evaluate(
    route: RouteKind,
    path: &str,
    method: &Method,
    token: Option<&str>,
    tokens: &TokenService,
) -> Decision {
    match route {
        RouteKind::Public => {
            // Only the guest-only pages care whether the visitor is signed in
            if !is_guest_only(path) {
                return Decision::Allow(None);
            }
            match token {
                Some(t) if tokens.verify(t).is_ok() => Decision::Redirect(DASHBOARD_PATH),
                _ => Decision::Allow(None),
            }
        }
        RouteKind::Page | RouteKind::Api => {
            let Some(token) = token else {
                return reject(route, AuthError::Unauthenticated);
            };

            let claims = match tokens.verify(token) {
                Ok(claims) => claims,
                Err(_) => return reject(route, AuthError::InvalidToken),
            };

            if route == RouteKind::Api && !claims.role.allows(method) {
                return Decision::Deny(AuthError::Unauthorized);
            }

            Decision::Allow(Some(claims))
        }
    }
}

fn reject(route: RouteKind, err: AuthError) -> Decision {
    match route {
        RouteKind::Page => Decision::Redirect(LOGIN_PATH),
        _ => Decision::Deny(err),
    }
}

/// Drop identity headers the client may have sent itself
fn strip_identity(headers: &mut HeaderMap) {
    headers.remove(USER_ID_HEADER);
    headers.remove(USER_ROLE_HEADER);
}

fn attach_identity(headers: &mut HeaderMap, claims: &Claims) -> Result<(), AuthError> {
    let user_id =
        HeaderValue::from_str(&claims.user_id).map_err(|_| AuthError::InvalidToken)?;
    headers.insert(USER_ID_HEADER, user_id);
    headers.insert(
        USER_ROLE_HEADER,
        HeaderValue::from_static(claims.role.as_str()),
    );
    Ok(())
}

/// Auth middleware applied to the whole application router
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    strip_identity(request.headers_mut());

    let path = request.uri().path().to_string();
    let route = RouteKind::classify(&path);
    let token = token_from_headers(request.headers());

    let decision = evaluate(
        route,
        &path,
        request.method(),
        token.as_deref(),
        &state.tokens,
    );

    match decision {
        Decision::Allow(None) => next.run(request).await,
        Decision::Allow(Some(claims)) => {
            if let Err(err) = attach_identity(request.headers_mut(), &claims) {
                debug!(path = %path, "Token claims not representable as headers");
                return match route {
                    RouteKind::Page => Redirect::temporary(LOGIN_PATH).into_response(),
                    _ => err.into_response(),
                };
            }
            next.run(request).await
        }
        Decision::Redirect(to) => {
            debug!(path = %path, to = to, "Redirecting");
            Redirect::temporary(to).into_response()
        }
        Decision::Deny(err) => {
            debug!(path = %path, method = %request.method(), reason = %err, "Request denied");
            err.into_response()
        }
    }
}

/// Identity forwarded by [`authorize`], for handlers behind protected routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|id| !id.is_empty())
            .ok_or(AuthError::Unauthenticated)?;

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|r| r.parse::<Role>().ok())
            .ok_or(AuthError::Unauthorized)?;

        Ok(CurrentUser {
            id: id.to_string(),
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::NewClaims;
    use chrono::{Duration, Utc};

    fn tokens() -> TokenService {
        TokenService::new("middleware-test-secret")
    }

    fn token_for(tokens: &TokenService, role: Role) -> String {
        tokens
            .issue(NewClaims {
                user_id: "u1".to_string(),
                email: "u1@example.com".to_string(),
                role,
                name: None,
            })
            .unwrap()
    }

    fn run(path: &str, method: Method, token: Option<&str>, tokens: &TokenService) -> Decision {
        evaluate(RouteKind::classify(path), path, &method, token, tokens)
    }

    #[test]
    fn test_public_routes_never_need_a_cookie() {
        let tokens = tokens();
        for path in crate::auth::route::PUBLIC_ROUTES {
            for method in [Method::GET, Method::POST] {
                assert_eq!(run(path, method, None, &tokens), Decision::Allow(None), "{}", path);
            }
        }
    }

    #[test]
    fn test_missing_cookie_page_redirects_api_401() {
        let tokens = tokens();
        assert_eq!(
            run("/dashboard", Method::GET, None, &tokens),
            Decision::Redirect("/login")
        );
        assert_eq!(
            run("/api/projects", Method::POST, None, &tokens),
            Decision::Deny(AuthError::Unauthenticated)
        );
    }

    #[test]
    fn test_bad_token_page_redirects_api_invalid() {
        let tokens = tokens();
        assert_eq!(
            run("/dashboard/skills", Method::GET, Some("bogus"), &tokens),
            Decision::Redirect("/login")
        );
        assert_eq!(
            run("/api/skills", Method::GET, Some("bogus"), &tokens),
            Decision::Deny(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_staff_is_read_only_on_api() {
        let tokens = tokens();
        let staff = token_for(&tokens, Role::Staff);

        assert!(matches!(
            run("/api/projects", Method::GET, Some(&staff), &tokens),
            Decision::Allow(Some(_))
        ));
        for method in [Method::POST, Method::PUT, Method::DELETE] {
            assert_eq!(
                run("/api/projects", method, Some(&staff), &tokens),
                Decision::Deny(AuthError::Unauthorized)
            );
        }
    }

    #[test]
    fn test_super_admin_allowed_everything() {
        let tokens = tokens();
        let owner = token_for(&tokens, Role::SuperAdmin);
        for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
            assert!(matches!(
                run("/api/articles", method, Some(&owner), &tokens),
                Decision::Allow(Some(_))
            ));
        }
    }

    #[test]
    fn test_pages_skip_method_check() {
        let tokens = tokens();
        let staff = token_for(&tokens, Role::Staff);
        assert!(matches!(
            run("/dashboard", Method::POST, Some(&staff), &tokens),
            Decision::Allow(Some(_))
        ));
    }

    #[test]
    fn test_guest_pages_bounce_valid_sessions() {
        let tokens = tokens();
        let admin = token_for(&tokens, Role::Admin);

        assert_eq!(
            run("/login", Method::GET, Some(&admin), &tokens),
            Decision::Redirect("/dashboard")
        );
        assert_eq!(
            run("/register", Method::GET, Some(&admin), &tokens),
            Decision::Redirect("/dashboard")
        );
        // A stale cookie must not cause a /login <-> /dashboard loop
        assert_eq!(
            run("/login", Method::GET, Some("stale"), &tokens),
            Decision::Allow(None)
        );
        // Other public routes do not bounce
        assert_eq!(run("/", Method::GET, Some(&admin), &tokens), Decision::Allow(None));
    }

    #[test]
    fn test_public_routes_ignore_cookie_contents() {
        let tokens = tokens();
        let admin = token_for(&tokens, Role::Admin);
        let foreign = token_for(&TokenService::new("some-other-secret"), Role::Admin);

        for path in crate::auth::route::PUBLIC_ROUTES {
            if is_guest_only(path) {
                continue;
            }
            for token in [admin.as_str(), foreign.as_str(), "garbage"] {
                assert_eq!(
                    run(path, Method::GET, Some(token), &tokens),
                    Decision::Allow(None),
                    "{}",
                    path
                );
            }
        }
    }

    #[test]
    fn test_token_age_at_dashboard() {
        let tokens = tokens();
        let claims = NewClaims {
            user_id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            role: Role::Staff,
            name: None,
        };

        let fresh_enough = tokens
            .issue_at(claims.clone(), Utc::now() - Duration::hours(23) - Duration::minutes(59))
            .unwrap();
        assert!(matches!(
            run("/dashboard", Method::GET, Some(&fresh_enough), &tokens),
            Decision::Allow(Some(_))
        ));

        let expired = tokens
            .issue_at(claims, Utc::now() - Duration::hours(25))
            .unwrap();
        assert_eq!(
            run("/dashboard", Method::GET, Some(&expired), &tokens),
            Decision::Redirect("/login")
        );
    }

    #[test]
    fn test_auth_error_statuses() {
        use axum::http::StatusCode;
        assert_eq!(AuthError::Unauthenticated.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidToken.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Unauthorized.into_response().status(), StatusCode::FORBIDDEN);
    }
}
