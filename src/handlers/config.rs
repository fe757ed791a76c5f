//! Config store handlers: read, upsert, bulk upsert, export and import.

use crate::error::AppError;
use crate::extractors::AppJson;
use crate::kv::{parse_bulk_items, StoredValue};
use crate::response::{ack_count, ack_key};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

const EXPORT_FILENAME: &str = "config.json";

#[derive(Serialize)]
pub struct ConfigEntryBody {
    pub key: String,
    pub value: StoredValue,
}

/// GET /config: every key with its decoded value.
pub async fn get_all_config(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, StoredValue>>, AppError> {
    Ok(Json(state.config.get_all().await?))
}

/// GET /config/:key
pub async fn get_config(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ConfigEntryBody>, AppError> {
    let value = state.config.get_by_key(&key).await?;
    Ok(Json(ConfigEntryBody { key, value }))
}

/// GET /config/bulk: a stored key that shares its path with the bulk route.
pub async fn get_config_bulk_key(state: State<AppState>) -> Result<Json<ConfigEntryBody>, AppError> {
    get_config(state, Path("bulk".to_string())).await
}

/// GET /config/import
pub async fn get_config_import_key(state: State<AppState>) -> Result<Json<ConfigEntryBody>, AppError> {
    get_config(state, Path("import".to_string())).await
}

/// PUT /config: body `{key, value}`.
pub async fn put_config(
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> Result<impl IntoResponse, AppError> {
    let key = match body.get("key") {
        Some(Value::String(k)) if !k.is_empty() => k.clone(),
        _ => return Err(AppError::BadRequest("missing \"key\"".into())),
    };
    let value = body.get("value").cloned().unwrap_or(Value::Null);
    state.config.upsert_one(&key, &value).await?;
    Ok(ack_key(key))
}

/// PUT /config/bulk: body `[{key, value}, ...]`, applied all-or-nothing.
pub async fn put_config_bulk(
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> Result<impl IntoResponse, AppError> {
    let items = parse_bulk_items(body)?;
    let count = state.config.bulk_upsert(items).await?;
    Ok(ack_count(count))
}

/// GET /config/export/json: the whole store as a downloadable JSON file.
pub async fn export_config(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.config.export_all().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
            ),
        ],
        body,
    ))
}

/// POST /config/import: body `{data: {key: value, ...}}`; existing keys are overwritten.
pub async fn import_config(
    State(state): State<AppState>,
    AppJson(mut body): AppJson<Value>,
) -> Result<impl IntoResponse, AppError> {
    let data = body.get_mut("data").map(Value::take);
    let count = state.config.import_all(data).await?;
    Ok(ack_count(count))
}
