// src/utils/auth.rs

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{error::AppError, state::AppState};

/// The single administrator allowed to publish.
///
/// Only an argon2 hash of the configured password is kept in memory.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    username: String,
    password_hash: String,
}

impl AdminCredentials {
    pub fn new(username: &str, password: &str) -> Result<Self, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
            .to_string();

        Ok(Self {
            username: username.to_string(),
            password_hash,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Checks a username/password pair. Any hashing failure counts as a mismatch.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        if username != self.username {
            return false;
        }

        match PasswordHash::new(&self.password_hash) {
            Ok(parsed_hash) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
            Err(e) => {
                tracing::error!("Stored admin password hash is unreadable: {}", e);
                false
            }
        }
    }
}

/// Parses an `Authorization: Basic <base64(user:pass)>` header value.
///
/// The password may contain `:`; only the first one separates the pair.
pub fn parse_basic_auth(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}

/// Axum Middleware: Basic authentication for write routes.
///
/// Lets the request through only when the header carries the configured
/// administrator's credentials. With no administrator configured every
/// request is rejected.
pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(admin) = state.admin.clone() else {
        tracing::warn!("Rejected admin request: no administrator configured");
        return Err(unauthorized());
    };

    let credentials = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_basic_auth);

    let Some((username, password)) = credentials else {
        return Err(unauthorized());
    };

    if !verify_off_thread(admin, username, password).await? {
        tracing::warn!("Rejected admin request: invalid credentials");
        return Err(unauthorized());
    }

    Ok(next.run(req).await)
}

/// Runs argon2 verification on the blocking pool.
async fn verify_off_thread(
    admin: Arc<AdminCredentials>,
    username: String,
    password: String,
) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || admin.verify(&username, &password))
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))
}

fn unauthorized() -> AppError {
    AppError::AuthError("Unauthorized".to_string())
}
