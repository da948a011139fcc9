use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Social {
    pub id: String,
    pub user_id: String,
    pub platform: String,
    pub url: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct SocialRequest {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub url: String,
}
