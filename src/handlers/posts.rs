// src/handlers/posts.rs

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::post::{
        CreatePostRequest, NewPost, Post, PostListParams, PostSummary, PreviewRequest,
        PreviewResponse,
    },
    utils::{html::clean_html, slug::post_slug},
};

/// List posts (Recent first), without their bodies.
/// Supports cursor-based pagination on (created_at, slug).
pub async fn list_posts(
    State(pool): State<SqlitePool>,
    Query(params): Query<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(20).clamp(1, 100); // Default 20, max 100

    let posts = sqlx::query_as::<_, PostSummary>(
        r#"
        SELECT slug, tile_title, header, cover, created_at
        FROM posts
        WHERE ?1 IS NULL
           OR created_at < ?1
           OR (created_at = ?1 AND id < (SELECT id FROM posts WHERE slug = ?3))
        ORDER BY created_at DESC, id DESC
        LIMIT ?2
        "#,
    )
    .bind(params.cursor)
    .bind(limit)
    .bind(params.cursor_slug)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list posts: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(posts))
}

/// Get a single post by slug.
pub async fn get_post(
    State(pool): State<SqlitePool>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        SELECT slug, tile_title, header, cover, content_html, created_at
        FROM posts
        WHERE slug = ?1
        LIMIT 1
        "#,
    )
    .bind(&slug)
    .fetch_optional(&pool)
    .await
    .map_err(|e| AppError::InternalServerError(e.to_string()))?
    .ok_or(AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(post))
}

/// Create a new post.
/// Requires: Basic auth as the administrator.
///
/// The body is sanitized before validation, so content that cleans down to
/// nothing is rejected like an empty one.
pub async fn create_post(
    State(pool): State<SqlitePool>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    // 1. Normalize payload
    let new_post = prepare_post(payload);

    // 2. Validate
    if let Err(validation_errors) = new_post.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    // 3. Insert Post
    sqlx::query(
        r#"
        INSERT INTO posts (slug, tile_title, header, cover, content_html, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&new_post.slug)
    .bind(&new_post.tile_title)
    .bind(&new_post.header)
    .bind(&new_post.cover)
    .bind(&new_post.content_html)
    .bind(new_post.created_at)
    .execute(&pool)
    .await
    .map_err(|e| {
        let is_unique_violation = e
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation());
        if is_unique_violation {
            AppError::Conflict(format!("Slug '{}' already exists", new_post.slug))
        } else {
            tracing::error!("Failed to create post: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    tracing::info!(slug = %new_post.slug, "Post created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"ok": true, "slug": new_post.slug})),
    ))
}

/// Sanitize content for preview without saving it.
/// Requires: Basic auth as the administrator.
pub async fn preview_post(
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    Ok(Json(PreviewResponse {
        content_html: clean_html(&payload.content_html),
    }))
}

/// Trims the text fields, sanitizes the body and derives the slug.
fn prepare_post(payload: CreatePostRequest) -> NewPost {
    let created_at = Utc::now();
    let tile_title = payload.tile_title.trim().to_string();
    let header = payload.header.trim().to_string();
    let cover = payload
        .cover
        .map(|cover| cover.trim().to_string())
        .filter(|cover| !cover.is_empty());

    let content_html = clean_html(&payload.content_html);
    if content_html.len() != payload.content_html.len() {
        tracing::debug!(
            before = payload.content_html.len(),
            after = content_html.len(),
            "Sanitizer rewrote post content"
        );
    }

    let slug = post_slug(
        payload.slug.as_deref(),
        &tile_title,
        &header,
        created_at.timestamp_millis(),
    );

    NewPost {
        slug,
        tile_title,
        header,
        cover,
        content_html,
        created_at,
    }
}
