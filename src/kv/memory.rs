//! In-memory `KvStore` for unit tests. Bulk writes stage into a copy and swap on success.

use super::store::KvStore;
use crate::error::AppError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Default)]
pub(crate) struct MemoryKvStore {
    entries: Mutex<BTreeMap<String, String>>,
    fail_on_key: Option<String>,
    per_entry_delay: Option<Duration>,
}

impl MemoryKvStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Bulk writes fail when they reach `key`, after earlier entries were staged.
    pub(crate) fn failing_on(key: &str) -> Self {
        MemoryKvStore {
            fail_on_key: Some(key.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn with_delay(delay: Duration) -> Self {
        MemoryKvStore {
            per_entry_delay: Some(delay),
            ..Self::default()
        }
    }

    pub(crate) async fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.lock().await.clone()
    }

    async fn stage(
        &self,
        staged: &mut BTreeMap<String, String>,
        entries: &[(String, String)],
    ) -> Result<u64, AppError> {
        for (key, value) in entries {
            if let Some(delay) = self.per_entry_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_on_key.as_deref() == Some(key.as_str()) {
                return Err(AppError::Internal(format!("simulated write failure on {}", key)));
            }
            staged.insert(key.clone(), value.clone());
        }
        Ok(entries.len() as u64)
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn entries(&self) -> Result<Vec<(String, String)>, AppError> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn put_all(
        &self,
        entries: &[(String, String)],
        deadline: Option<Instant>,
    ) -> Result<u64, AppError> {
        let mut guard = self.entries.lock().await;
        let mut staged = guard.clone();
        let outcome = match deadline {
            Some(at) => match tokio::time::timeout_at(at, self.stage(&mut staged, entries)).await {
                Ok(res) => res,
                Err(_) => Err(AppError::Timeout("bulk config transaction".into())),
            },
            None => self.stage(&mut staged, entries).await,
        };
        let count = outcome?;
        *guard = staged;
        Ok(count)
    }
}
