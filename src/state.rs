// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::{config::Config, error::AppError, utils::auth::AdminCredentials};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    /// `None` when no administrator is configured; writes are then refused.
    pub admin: Option<Arc<AdminCredentials>>,
}

impl AppState {
    /// Builds the state, hashing the configured administrator password.
    pub fn new(pool: SqlitePool, config: Config) -> Result<Self, AppError> {
        let admin = match (&config.admin_username, &config.admin_password) {
            (Some(username), Some(password)) => {
                Some(Arc::new(AdminCredentials::new(username, password)?))
            }
            _ => None,
        };

        Ok(Self {
            pool,
            config,
            admin,
        })
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
