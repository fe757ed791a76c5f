//! ConfigService: JSON-valued reads and writes over a `KvStore`, including all-or-nothing bulk upserts.

use super::store::KvStore;
use super::value::{encode_value, StoredValue};
use crate::error::AppError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// One entry of a bulk write.
#[derive(Clone, Debug, PartialEq)]
pub struct BulkItem {
    pub key: String,
    pub value: Value,
}

#[derive(Clone)]
pub struct ConfigService {
    store: Arc<dyn KvStore>,
    bulk_timeout: Option<Duration>,
}

impl ConfigService {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        ConfigService {
            store,
            bulk_timeout: None,
        }
    }

    /// Bound every bulk transaction started through `bulk_upsert` by `timeout`.
    pub fn with_bulk_timeout(mut self, timeout: Duration) -> Self {
        self.bulk_timeout = Some(timeout);
        self
    }

    /// Every entry, keyed and ordered by key. Undecodable rows come back as `StoredValue::Raw`.
    pub async fn get_all(&self) -> Result<BTreeMap<String, StoredValue>, AppError> {
        let rows = self.store.entries().await?;
        Ok(rows
            .into_iter()
            .map(|(key, raw)| (key, StoredValue::decode(raw)))
            .collect())
    }

    pub async fn get_by_key(&self, key: &str) -> Result<StoredValue, AppError> {
        let raw = self
            .store
            .get(key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("key not found: {}", key)))?;
        Ok(StoredValue::decode(raw))
    }

    pub async fn upsert_one(&self, key: &str, value: &Value) -> Result<(), AppError> {
        if key.is_empty() {
            return Err(AppError::BadRequest("missing \"key\"".into()));
        }
        let encoded = encode_value(value)?;
        self.store.put(key, &encoded).await
    }

    /// Bulk upsert using the configured timeout. Returns the number of entries written.
    pub async fn bulk_upsert(&self, items: Vec<BulkItem>) -> Result<usize, AppError> {
        let deadline = self.bulk_timeout.map(|t| Instant::now() + t);
        self.bulk_upsert_until(items, deadline).await
    }

    /// Write all items in one transaction that must finish before `deadline`.
    /// Nothing is written when any item is invalid or any write fails.
    pub async fn bulk_upsert_until(
        &self,
        items: Vec<BulkItem>,
        deadline: Option<Instant>,
    ) -> Result<usize, AppError> {
        if items.is_empty() {
            return Err(AppError::BadRequest("an array of items is required".into()));
        }
        if let Some(pos) = items.iter().position(|it| it.key.is_empty()) {
            return Err(AppError::BadRequest(format!("item {} has no \"key\"", pos)));
        }
        let attempted = items.len();
        let mut encoded = Vec::with_capacity(attempted);
        for item in items {
            let value = encode_value(&item.value)?;
            encoded.push((item.key, value));
        }
        match self.store.put_all(&encoded, deadline).await {
            Ok(_) => Ok(attempted),
            Err(e) => {
                tracing::warn!(attempted, error = %e, "config bulk upsert rolled back");
                Err(AppError::BulkRolledBack {
                    attempted,
                    source: Box::new(e),
                })
            }
        }
    }

    /// All entries as pretty-printed JSON (2-space indent), keys ascending.
    pub async fn export_all(&self) -> Result<String, AppError> {
        let all = self.get_all().await?;
        serde_json::to_string_pretty(&all)
            .map_err(|e| AppError::Internal(format!("serialize config export: {}", e)))
    }

    /// Upsert every member of a JSON object through `bulk_upsert`, in the object's own order.
    pub async fn import_all(&self, data: Option<Value>) -> Result<usize, AppError> {
        self.bulk_upsert(import_items(data)?).await
    }
}

/// Members of an import `data` object as bulk items, in document order.
fn import_items(data: Option<Value>) -> Result<Vec<BulkItem>, AppError> {
    match data {
        Some(Value::Object(map)) => Ok(map
            .into_iter()
            .map(|(key, value)| BulkItem { key, value })
            .collect()),
        _ => Err(AppError::BadRequest("body must include a \"data\" object".into())),
    }
}

/// Parse a bulk request body: a non-empty array of `{key, value}` objects.
/// A missing `value` is taken as JSON null.
pub fn parse_bulk_items(body: Value) -> Result<Vec<BulkItem>, AppError> {
    let arr = match body {
        Value::Array(arr) if !arr.is_empty() => arr,
        _ => return Err(AppError::BadRequest("an array of items is required".into())),
    };
    let mut items = Vec::with_capacity(arr.len());
    for (pos, item) in arr.into_iter().enumerate() {
        let Value::Object(mut obj) = item else {
            return Err(AppError::BadRequest(format!("item {} must be an object", pos)));
        };
        let key = match obj.remove("key") {
            Some(Value::String(k)) if !k.is_empty() => k,
            _ => return Err(AppError::BadRequest(format!("item {} has no \"key\"", pos))),
        };
        let value = obj.remove("value").unwrap_or(Value::Null);
        items.push(BulkItem { key, value });
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::memory::MemoryKvStore;
    use serde_json::json;

    fn service_with(store: Arc<MemoryKvStore>) -> ConfigService {
        ConfigService::new(store)
    }

    fn item(key: &str, value: Value) -> BulkItem {
        BulkItem {
            key: key.into(),
            value,
        }
    }

    #[tokio::test]
    async fn upsert_then_get_returns_the_value() {
        let svc = service_with(Arc::new(MemoryKvStore::new()));
        svc.upsert_one("feature.flag", &json!(true)).await.unwrap();
        let got = svc.get_by_key("feature.flag").await.unwrap();
        assert_eq!(got, StoredValue::Decoded(json!(true)));
    }

    #[tokio::test]
    async fn upsert_overwrites_existing_key() {
        let store = Arc::new(MemoryKvStore::new());
        let svc = service_with(store.clone());
        svc.upsert_one("iva", &json!(0.12)).await.unwrap();
        svc.upsert_one("iva", &json!(0.13)).await.unwrap();
        svc.upsert_one("iva", &json!(0.13)).await.unwrap();
        assert_eq!(store.snapshot().await.len(), 1);
        assert_eq!(svc.get_by_key("iva").await.unwrap().into_json(), json!(0.13));
    }

    #[tokio::test]
    async fn string_values_come_back_verbatim() {
        let svc = service_with(Arc::new(MemoryKvStore::new()));
        svc.upsert_one("empresa.nombre", &json!("Laboratorios Andinos"))
            .await
            .unwrap();
        let got = svc.get_by_key("empresa.nombre").await.unwrap();
        assert_eq!(got, StoredValue::Raw("Laboratorios Andinos".into()));
    }

    #[tokio::test]
    async fn empty_key_is_rejected() {
        let svc = service_with(Arc::new(MemoryKvStore::new()));
        let err = svc.upsert_one("", &json!(1)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let svc = service_with(Arc::new(MemoryKvStore::new()));
        let err = svc.get_by_key("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn bulk_upsert_writes_every_item() {
        let svc = service_with(Arc::new(MemoryKvStore::new()));
        svc.upsert_one("prior", &json!("kept")).await.unwrap();
        let count = svc
            .bulk_upsert(vec![item("x", json!(1)), item("y", json!(2))])
            .await
            .unwrap();
        assert_eq!(count, 2);
        let all = svc.get_all().await.unwrap();
        assert_eq!(all.get("x"), Some(&StoredValue::Decoded(json!(1))));
        assert_eq!(all.get("y"), Some(&StoredValue::Decoded(json!(2))));
        assert!(all.contains_key("prior"));
    }

    #[tokio::test]
    async fn bulk_upsert_with_keyless_last_item_changes_nothing() {
        let store = Arc::new(MemoryKvStore::new());
        let svc = service_with(store.clone());
        svc.upsert_one("a", &json!(1)).await.unwrap();
        let before = store.snapshot().await;

        let err = svc
            .bulk_upsert(vec![item("a", json!(99)), item("b", json!(2)), item("", json!(3))])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn failed_write_rolls_back_the_whole_batch() {
        let store = Arc::new(MemoryKvStore::failing_on("boom"));
        let svc = service_with(store.clone());
        svc.upsert_one("a", &json!(1)).await.unwrap();
        let before = store.snapshot().await;

        let err = svc
            .bulk_upsert(vec![item("a", json!(2)), item("b", json!(3)), item("boom", json!(4))])
            .await
            .unwrap_err();
        match err {
            AppError::BulkRolledBack { attempted, .. } => assert_eq!(attempted, 3),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn bulk_deadline_rolls_back() {
        let store = Arc::new(MemoryKvStore::with_delay(Duration::from_millis(50)));
        let svc = ConfigService::new(store.clone()).with_bulk_timeout(Duration::from_millis(10));
        let err = svc
            .bulk_upsert(vec![item("slow", json!(1)), item("slower", json!(2))])
            .await
            .unwrap_err();
        match err {
            AppError::BulkRolledBack { source, .. } => {
                assert!(matches!(*source, AppError::Timeout(_)))
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn empty_bulk_is_rejected() {
        let svc = service_with(Arc::new(MemoryKvStore::new()));
        let err = svc.bulk_upsert(Vec::new()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn export_orders_keys_ascending() {
        let svc = service_with(Arc::new(MemoryKvStore::new()));
        svc.upsert_one("b", &json!(2)).await.unwrap();
        svc.upsert_one("a", &json!(1)).await.unwrap();
        let out = svc.export_all().await.unwrap();
        assert_eq!(out, "{\n  \"a\": 1,\n  \"b\": 2\n}");
    }

    #[tokio::test]
    async fn import_empty_object_is_rejected_and_changes_nothing() {
        let store = Arc::new(MemoryKvStore::new());
        let svc = service_with(store.clone());
        let err = svc.import_all(Some(json!({}))).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn import_requires_an_object() {
        let svc = service_with(Arc::new(MemoryKvStore::new()));
        for data in [None, Some(json!([1, 2])), Some(json!("text"))] {
            let err = svc.import_all(data).await.unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }

    #[tokio::test]
    async fn import_upserts_each_member() {
        let svc = service_with(Arc::new(MemoryKvStore::new()));
        let count = svc
            .import_all(Some(json!({"moneda": "USD", "decimales": 2})))
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(svc.get_by_key("decimales").await.unwrap().into_json(), json!(2));
        assert_eq!(svc.get_by_key("moneda").await.unwrap().into_json(), json!("USD"));
    }

    #[test]
    fn import_items_keep_document_order() {
        let data: Value = serde_json::from_str(r#"{"zeta": 1, "alpha": "a", "mid": null}"#).unwrap();
        let keys: Vec<String> = import_items(Some(data)).unwrap().into_iter().map(|it| it.key).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn parse_bulk_items_validates_shape() {
        let items = parse_bulk_items(json!([{"key": "x", "value": 1}, {"key": "y"}])).unwrap();
        assert_eq!(items, vec![item("x", json!(1)), item("y", Value::Null)]);

        for bad in [json!([]), json!({"key": "x"}), json!([{"value": 1}]), json!([1]), json!([{"key": 7}])] {
            assert!(matches!(parse_bulk_items(bad), Err(AppError::BadRequest(_))));
        }
    }
}
