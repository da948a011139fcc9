//! Database seeders for built-in data

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::{create_user, find_super_admin, find_user_by_email};
use crate::auth::{hash_password, Role};

/// Create the site owner account unless a SUPER_ADMIN already exists.
///
/// An existing account with the configured email is left untouched, whatever
/// its role. Returns `true` only when a user was created.
pub async fn ensure_super_admin(
    pool: &SqlitePool,
    email: &str,
    password: &str,
    name: Option<&str>,
) -> Result<bool> {
    if find_super_admin(pool).await?.is_some() {
        return Ok(false);
    }

    if let Some(existing) = find_user_by_email(pool, email).await? {
        warn!(
            email = %email,
            role = %existing.role,
            "Admin email belongs to an existing account; not seeding a SUPER_ADMIN"
        );
        return Ok(false);
    }

    let password_hash = hash_password(password)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("Failed to hash seed password")?;

    create_user(pool, email, &password_hash, name, Role::SuperAdmin).await?;
    info!(email = %email, "Created SUPER_ADMIN account");
    Ok(true)
}
