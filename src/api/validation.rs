//! Input validation for API requests.
//!
//! Each check returns `Result<(), String>` with a user-facing message. To
//! collect several failures into one response use `ValidationErrorBuilder`
//! from the `error` module.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

/// Minimum password length for registration and password changes
pub const MIN_PASSWORD_LEN: usize = 6;

lazy_static! {
    /// Something@something.tld, no whitespace
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    /// Absolute HTTP/HTTPS URL
    static ref HTTP_URL_REGEX: Regex = Regex::new(
        r"^https?://[a-zA-Z0-9][-a-zA-Z0-9]*(\.[a-zA-Z0-9][-a-zA-Z0-9]*)*(:\d+)?(/\S*)?$"
    ).unwrap();

    static ref SLUG_STRIP_REGEX: Regex = Regex::new(r"[^\w\s-]").unwrap();
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a new password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }

    Ok(())
}

/// Validate a required free-text field
pub fn validate_required(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field_name));
    }
    Ok(())
}

/// Validate an HTTP(S) URL
pub fn validate_url(url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Err("URL is required".to_string());
    }

    if url.len() > 2048 {
        return Err("URL is too long (max 2048 characters)".to_string());
    }

    if !HTTP_URL_REGEX.is_match(url) {
        return Err("Invalid URL format. Must be an http(s) URL".to_string());
    }

    Ok(())
}

/// Validate an optional URL; empty counts as absent
pub fn validate_optional_url(url: &Option<String>) -> Result<(), String> {
    match url.as_deref() {
        Some(u) if !u.is_empty() => validate_url(u),
        _ => Ok(()),
    }
}

/// Skill levels run from 1 to 5
pub fn validate_skill_level(level: i64) -> Result<(), String> {
    if !(1..=5).contains(&level) {
        return Err("Level must be between 1 and 5".to_string());
    }
    Ok(())
}

/// Validate a `YYYY-MM-DD` calendar date
pub fn validate_date(date: &str, field_name: &str) -> Result<(), String> {
    if date.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        return Err(format!("{} must be a date in YYYY-MM-DD format", field_name));
    }

    Ok(())
}

/// Validate an optional date; empty counts as absent
pub fn validate_optional_date(date: &Option<String>, field_name: &str) -> Result<(), String> {
    match date.as_deref() {
        Some(d) if !d.is_empty() => validate_date(d, field_name),
        _ => Ok(()),
    }
}

/// Validate a UUID string
pub fn validate_uuid(id: &str, field_name: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if uuid::Uuid::parse_str(id).is_err() {
        return Err(format!("Invalid {} format", field_name));
    }

    Ok(())
}

/// URL slug for an article title: lowercase, punctuation dropped, whitespace
/// runs collapsed to `-`.
pub fn slugify(title: &str) -> String {
    let lower = title.trim().to_lowercase();
    let stripped = SLUG_STRIP_REGEX.replace_all(&lower, "");
    WHITESPACE_REGEX.replace_all(stripped.trim(), "-").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.co").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("user@example").is_err());
        assert!(validate_email("user example@x.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("longer-password").is_ok());

        assert!(validate_password("").is_err());
        let err = validate_password("12345").unwrap_err();
        assert!(err.contains("at least 6"));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://github.com/someone").is_ok());
        assert!(validate_url("http://localhost:3000/path?q=1").is_ok());

        assert!(validate_url("").is_err());
        assert!(validate_url("github.com/someone").is_err());
        assert!(validate_url("javascript:alert(1)").is_err());
        assert!(validate_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_optional_url() {
        assert!(validate_optional_url(&None).is_ok());
        assert!(validate_optional_url(&Some(String::new())).is_ok());
        assert!(validate_optional_url(&Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_validate_skill_level() {
        for level in 1..=5 {
            assert!(validate_skill_level(level).is_ok());
        }
        assert!(validate_skill_level(0).is_err());
        assert!(validate_skill_level(6).is_err());
        assert!(validate_skill_level(-1).is_err());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2024-01-31", "Start date").is_ok());
        assert!(validate_date("2024-02-30", "Start date").is_err());
        assert!(validate_date("31/01/2024", "Start date").is_err());
        assert_eq!(
            validate_date("", "Start date").unwrap_err(),
            "Start date is required"
        );
        assert!(validate_optional_date(&None, "End date").is_ok());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000", "id").is_ok());
        assert!(validate_uuid("", "id").is_err());
        assert!(validate_uuid("not-a-uuid", "id").is_err());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Rust, Axum & SQLite!  "), "rust-axum-sqlite");
        assert_eq!(slugify("Already-slugged title"), "already-slugged-title");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
    }
}
