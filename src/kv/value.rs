//! Stored representation of config values.

use crate::error::AppError;
use serde::Serialize;
use serde_json::Value;

/// A value read back from the store. Rows whose text is not valid JSON are kept as `Raw`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StoredValue {
    Decoded(Value),
    Raw(String),
}

impl StoredValue {
    pub fn decode(raw: String) -> Self {
        match serde_json::from_str::<Value>(&raw) {
            Ok(v) => StoredValue::Decoded(v),
            Err(_) => StoredValue::Raw(raw),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, StoredValue::Raw(_))
    }

    /// JSON view of the value; `Raw` text becomes a JSON string.
    pub fn into_json(self) -> Value {
        match self {
            StoredValue::Decoded(v) => v,
            StoredValue::Raw(s) => Value::String(s),
        }
    }
}

/// Text persisted for a value. Strings are stored verbatim, everything else as compact JSON.
pub fn encode_value(value: &Value) -> Result<String, AppError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => serde_json::to_string(other)
            .map_err(|e| AppError::Internal(format!("encode config value: {}", e))),
    }
}
