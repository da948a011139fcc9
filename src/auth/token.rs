//! Signed session tokens (HS256 JWT).
//!
//! Tokens are never stored server-side. They stay valid until `exp` even after
//! logout; logout only drops the cookie.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Role;

/// Fixed session lifetime: one day
pub const TOKEN_TTL_SECS: i64 = 86_400;

/// Claims carried by every session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Identity to put into a new token
#[derive(Debug, Clone)]
pub struct NewClaims {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub name: Option<String>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, malformed, expired, or carrying an unknown role
    #[error("invalid token")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Issues and verifies session tokens with a server-held secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // An expired token is rejected the second it expires
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token valid for [`TOKEN_TTL_SECS`] from now
    pub fn issue(&self, claims: NewClaims) -> Result<String, TokenError> {
        self.issue_at(claims, Utc::now())
    }

    /// Issue a token as if it had been signed at `issued_at`
    pub fn issue_at(&self, claims: NewClaims, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let expires_at = issued_at + Duration::seconds(TOKEN_TTL_SECS);
        let claims = Claims {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
            name: claims.name,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Check signature and expiry and return the claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(user_id: &str, role: Role) -> NewClaims {
        NewClaims {
            user_id: user_id.to_string(),
            email: format!("{}@example.com", user_id),
            role,
            name: Some("Test User".to_string()),
        }
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let tokens = TokenService::new("test-secret");
        let token = tokens.issue(claims("u1", Role::Admin)).unwrap();

        let decoded = tokens.verify(&token).unwrap();
        assert_eq!(decoded.user_id, "u1");
        assert_eq!(decoded.role, Role::Admin);
        assert_eq!(decoded.email, "u1@example.com");
        assert_eq!(decoded.exp - decoded.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenService::new("secret-1")
            .issue(claims("u1", Role::Staff))
            .unwrap();
        assert!(matches!(
            TokenService::new("secret-2").verify(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_rejected() {
        let tokens = TokenService::new("test-secret");
        assert!(tokens.verify("").is_err());
        assert!(tokens.verify("not.a.jwt").is_err());
        assert!(tokens.verify("garbage").is_err());
    }

    #[test]
    fn test_expired_rejected_even_with_valid_signature() {
        let tokens = TokenService::new("test-secret");
        let issued = Utc::now() - Duration::hours(25);
        let token = tokens.issue_at(claims("u1", Role::SuperAdmin), issued).unwrap();

        assert!(matches!(tokens.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_near_expiry_still_valid() {
        let tokens = TokenService::new("test-secret");
        let issued = Utc::now() - Duration::hours(23) - Duration::minutes(59);
        let token = tokens.issue_at(claims("u1", Role::Staff), issued).unwrap();

        assert!(tokens.verify(&token).is_ok());
    }

    #[test]
    fn test_unknown_role_rejected() {
        #[derive(Serialize)]
        struct Forged<'a> {
            #[serde(rename = "userId")]
            user_id: &'a str,
            email: &'a str,
            role: &'a str,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now().timestamp();
        let forged = Forged {
            user_id: "u1",
            email: "u1@example.com",
            role: "ROOT",
            iat: now,
            exp: now + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &forged,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(TokenService::new("test-secret").verify(&token).is_err());
    }
}
