//! Shared application state for all routes.

use crate::kv::{ConfigService, PgKvStore};
use crate::settings::{AuthSettings, Settings};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ConfigService,
    pub auth: AuthSettings,
}

impl AppState {
    /// State backed by `pool`, with the config store on the same pool.
    pub fn new(pool: PgPool, settings: &Settings) -> Self {
        let config = ConfigService::new(Arc::new(PgKvStore::new(pool.clone())))
            .with_bulk_timeout(settings.bulk_timeout);
        AppState {
            pool,
            config,
            auth: settings.auth.clone(),
        }
    }
}
