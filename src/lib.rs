//! Cotizador: quotation management REST backend over PostgreSQL, with a transactional
//! key-value configuration store.

pub mod auth;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod kv;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;

pub use error::{AppError, SettingsError};
pub use kv::{ConfigService, KvStore, PgKvStore, StoredValue};
pub use routes::{api_routes, app, common_routes};
pub use settings::Settings;
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_tables};
