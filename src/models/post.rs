// src/models/post.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::Validate;

/// Represents the 'posts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    /// Unique, URL-safe lookup key.
    pub slug: String,
    /// Title shown on the blog card.
    pub tile_title: String,
    /// Headline shown on the article page.
    pub header: String,
    /// Cover image URL.
    pub cover: Option<String>,
    /// Post body, already sanitized.
    pub content_html: String,
    pub created_at: DateTime<Utc>,
}

/// A post without its body, for listings.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PostSummary {
    pub slug: String,
    pub tile_title: String,
    pub header: String,
    pub cover: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a post, as sent by the admin panel.
///
/// Every field is optional on the wire; emptiness is caught by validating the
/// resulting [`NewPost`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePostRequest {
    pub slug: Option<String>,
    pub tile_title: String,
    pub header: String,
    pub cover: Option<String>,
    pub content_html: String,
}

/// A post ready to be inserted: trimmed, sanitized and slugged.
#[derive(Debug, Validate)]
pub struct NewPost {
    pub slug: String,

    #[validate(length(
        min = 1,
        max = 200,
        message = "Tile title length must be between 1 and 200 chars"
    ))]
    pub tile_title: String,

    #[validate(length(
        min = 1,
        max = 300,
        message = "Header length must be between 1 and 300 chars"
    ))]
    pub header: String,

    #[validate(
        length(max = 2000, message = "Cover URL must be at most 2000 chars"),
        custom(function = validate_cover_url)
    )]
    pub cover: Option<String>,

    #[validate(length(
        min = 1,
        max = 200000,
        message = "Content must be between 1 and 200000 chars after sanitization"
    ))]
    pub content_html: String,

    pub created_at: DateTime<Utc>,
}

/// Request body for previewing sanitized content without saving it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewRequest {
    pub content_html: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub content_html: String,
}

/// Query parameters for listing posts.
#[derive(Debug, Deserialize)]
pub struct PostListParams {
    /// Cursor for pagination: the created_at timestamp of the last post in the previous page.
    pub cursor: Option<DateTime<Utc>>,

    /// Slug of the last post in the previous page, breaking ties on `cursor`.
    pub cursor_slug: Option<String>,

    /// Number of items to return (default: 20, max: 100).
    pub limit: Option<i64>,
}

/// Covers are either relative references (served by the site itself) or
/// absolute http(s) URLs.
fn validate_cover_url(cover: &str) -> Result<(), validator::ValidationError> {
    match Url::parse(cover) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(_) => Err(validator::ValidationError::new("unsupported_cover_scheme")),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(()),
        Err(_) => Err(validator::ValidationError::new("invalid_cover_url")),
    }
}
