use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use tokio::sync::RwLock;

use consumer_api::{RecordStore, StorageKey, StoreError};

// ═══════════════════════════════════════════════════════════════
//  MemoryRecordStore
// ═══════════════════════════════════════════════════════════════

/// In-process document store keyed by `(namespace, key)`.
///
/// Для локального запуска и тестов: put перезаписывает запись по ключу,
/// при гонке за один ключ побеждает последняя запись.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<(String, String), serde_json::Value>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, namespace: &str, key: &str) -> Option<serde_json::Value> {
        let records = self.records.read().await;
        records.get(&(namespace.to_string(), key.to_string())).cloned()
    }

    /// Number of distinct `(namespace, key)` records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn put(
        &self,
        namespace: &str,
        key: &StorageKey,
        value: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        let id = (namespace.to_string(), key.as_str().to_string());
        Box::pin(async move {
            let mut records = self.records.write().await;
            records.insert(id, value);
            Ok(())
        })
    }
}
