//! Response envelopes shared by the resource handlers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// `{items, total, page, size}` used by product and user listings.
#[derive(Debug, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
}

/// `{total, page, pageSize, data}` used by the quotation listing.
#[derive(Debug, Serialize)]
pub struct QuotationPage<T> {
    pub total: i64,
    pub page: i64,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
    pub data: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct MessageWithData<T> {
    pub message: String,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

pub fn created_with_message<T: Serialize>(message: &str, data: T) -> (StatusCode, Json<MessageWithData<T>>) {
    (
        StatusCode::CREATED,
        Json(MessageWithData {
            message: message.to_string(),
            data,
        }),
    )
}

pub fn ack_key(key: String) -> Json<Ack> {
    Json(Ack {
        ok: true,
        key: Some(key),
        count: None,
    })
}

pub fn ack_count(count: usize) -> Json<Ack> {
    Json(Ack {
        ok: true,
        key: None,
        count: Some(count),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quotation_page_uses_camel_case_size() {
        let page = QuotationPage::<i32> {
            total: 0,
            page: 1,
            page_size: 10,
            data: vec![],
        };
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            json!({"total": 0, "page": 1, "pageSize": 10, "data": []})
        );
    }

    #[test]
    fn acks_omit_unset_fields() {
        assert_eq!(serde_json::to_value(&ack_count(2).0).unwrap(), json!({"ok": true, "count": 2}));
        assert_eq!(
            serde_json::to_value(&ack_key("a".into()).0).unwrap(),
            json!({"ok": true, "key": "a"})
        );
    }
}
