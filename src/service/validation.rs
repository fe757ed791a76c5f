//! Request presence checks and body helpers.

use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub struct RequestValidator;

impl RequestValidator {
    /// Every field in `fields` must be present and truthy; otherwise `message` is returned as a 400.
    pub fn require(body: &Map<String, Value>, fields: &[&str], message: &str) -> Result<(), AppError> {
        let all_present = fields
            .iter()
            .all(|f| body.get(*f).map(is_truthy).unwrap_or(false));
        if all_present {
            Ok(())
        } else {
            Err(AppError::BadRequest(message.to_string()))
        }
    }

    /// Deserialize a checked body into its typed request.
    pub fn parse<T: DeserializeOwned>(body: Map<String, Value>) -> Result<T, AppError> {
        serde_json::from_value(Value::Object(body))
            .map_err(|e| AppError::BadRequest(format!("invalid body: {}", e)))
    }
}

/// Presence in the loose sense clients rely on: null, false, 0 and "" count as missing.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn body_object(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Value of a nullable text field: `None` when absent, `Some(None)` when null.
pub fn optional_text(body: &Map<String, Value>, field: &str) -> Result<Option<Option<String>>, AppError> {
    match body.get(field) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) => Ok(Some(Some(s.clone()))),
        Some(_) => Err(AppError::BadRequest(format!("{} must be a string or null", field))),
    }
}
