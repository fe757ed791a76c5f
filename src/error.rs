//! Typed errors and HTTP mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for foreign_key_violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("deadline elapsed: {0}")]
    Timeout(String),
    #[error("bulk upsert rolled back, {attempted} entries not applied: {source}")]
    BulkRolledBack {
        attempted: usize,
        #[source]
        source: Box<AppError>,
    },
    #[error("internal: {0}")]
    Internal(String),
}

impl AppError {
    /// Turn a PostgreSQL constraint violation into the matching client error; other errors pass through.
    pub fn from_constraint(err: sqlx::Error, conflict_message: &str) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db| db.code())
            .map(|c| c.into_owned());
        match code.as_deref() {
            Some(UNIQUE_VIOLATION) => AppError::Conflict(conflict_message.to_string()),
            Some(FOREIGN_KEY_VIOLATION) => {
                AppError::BadRequest("referenced record does not exist".into())
            }
            _ => AppError::Db(err),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Db(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Db(_)
            | AppError::Timeout(_)
            | AppError::BulkRolledBack { .. }
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body extraction failures keep the `{message}` shape. Oversized bodies stay 413; anything
/// else (bad syntax, wrong shape, missing content type) is a 400.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::BulkRolledBack { attempted, .. } => {
                tracing::error!(error = %self, "request failed");
                format!("bulk update failed, {} entries were not applied", attempted)
            }
            _ if status.is_server_error() => {
                tracing::error!(error = %self, "request failed");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}
