//! Config store routes. `bulk` and `import` have static routes of their own, so GET on
//! those paths reads the key of the same name.

use crate::handlers::config::{
    export_config, get_all_config, get_config, get_config_bulk_key, get_config_import_key, import_config,
    put_config, put_config_bulk,
};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn config_routes(state: AppState) -> Router {
    Router::new()
        .route("/config", get(get_all_config).put(put_config))
        .route("/config/bulk", get(get_config_bulk_key).put(put_config_bulk))
        .route("/config/export/json", get(export_config))
        .route("/config/import", get(get_config_import_key).post(import_config))
        .route("/config/:key", get(get_config))
        .with_state(state)
}
