//! Owner profile shown at the top of the public portfolio.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub bio: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub avatar: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Text fields of a profile update; the avatar arrives as a separate upload
#[derive(Debug, Default)]
pub struct ProfileFields {
    pub bio: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
}
