// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers::posts, state::AppState, utils::auth::basic_auth_middleware};

/// Assembles the main application router.
///
/// * Public reads: post listing and single post by slug.
/// * Admin writes (Basic auth): post creation and sanitizer preview.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);
    let admin_only = middleware::from_fn_with_state(state.clone(), basic_auth_middleware);

    let post_routes = Router::new()
        .route(
            "/",
            get(posts::list_posts).merge(post(posts::create_post).route_layer(admin_only.clone())),
        )
        .route("/{slug}", get(posts::get_post));

    let preview_routes =
        Router::new().route("/", post(posts::preview_post).route_layer(admin_only));

    Router::new()
        .nest("/api/posts", post_routes)
        .nest("/api/preview", preview_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS for the admin panel and the public site.
/// An empty origin list allows any origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allow_origin = if allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
