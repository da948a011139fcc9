//! Session authentication and role-based authorization.

pub mod middleware;
mod password;
mod role;
pub mod route;
pub mod session;
pub mod token;

pub use middleware::{authorize, AuthError, CurrentUser};
pub use password::{hash_password, verify_password};
pub use role::{is_allowed, Role};
pub use route::RouteKind;
pub use session::{end_session, start_session, token_from_headers, SESSION_COOKIE};
pub use token::{Claims, NewClaims, TokenError, TokenService, TOKEN_TTL_SECS};
