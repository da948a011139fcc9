//! Blog article models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub published: bool,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Article joined with its author's display fields
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ArticleWithAuthor {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub published: bool,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub author_name: Option<String>,
    pub author_avatar: Option<String>,
}

/// Text fields of an article form; the cover image arrives as a separate upload
#[derive(Debug, Default)]
pub struct ArticleFields {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub published: bool,
}
