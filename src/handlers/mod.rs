//! HTTP handlers: config store, products, users, quotations and quotation lines.

pub mod config;
pub mod products;
pub mod quotations;
pub mod users;

use crate::error::AppError;

/// Numeric path id; anything else is a 400.
pub(crate) fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest("invalid id".into()))
}
