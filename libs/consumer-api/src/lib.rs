pub mod error;
pub mod util;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

pub use error::{StoreError, StoreErrorKind};
pub use util::lookup;

// ════════════════════════════════════════════════════════════════
//  Inbound message
// ════════════════════════════════════════════════════════════════

/// One delivery from the async messaging transport.
///
/// Built by the transport per call and handed to the handler by reference;
/// nothing downstream mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            body: body.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

// ════════════════════════════════════════════════════════════════
//  Typed payloads
// ════════════════════════════════════════════════════════════════

/// Payload of a "player joined" domain event.
///
/// `timestamp` is kept as the publisher sent it (ISO-8601 text).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerJoinedEvent {
    pub event_type: String,
    pub player_id: String,
    pub timestamp: String,
}

// ════════════════════════════════════════════════════════════════
//  Storage key / record
// ════════════════════════════════════════════════════════════════

/// Record key in the store: `<event-kind-prefix><id>`.
///
/// Same prefix + same id always gives the same key, so a redelivered event
/// overwrites its record instead of adding a second one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn new(prefix: &str, id: &str) -> Self {
        Self(format!("{prefix}{id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What ends up in the store for one eligible message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageRecord<T = serde_json::Value> {
    pub namespace: String,
    pub key: StorageKey,
    pub payload: T,
}

// ════════════════════════════════════════════════════════════════
//  Capabilities
// ════════════════════════════════════════════════════════════════

/// Key-value document store with upsert-by-key.
///
/// The handler only ever calls `put`. Implementations must be safe to share
/// between concurrent requests; a dropped future must abandon the write.
pub trait RecordStore: Send + Sync {
    /// Create or replace the document at `(namespace, key)`.
    fn put(
        &self,
        namespace: &str,
        key: &StorageKey,
        value: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;
}

/// Severity of an observability event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => f.write_str("debug"),
            LogLevel::Info => f.write_str("info"),
            LogLevel::Warn => f.write_str("warn"),
            LogLevel::Error => f.write_str("error"),
        }
    }
}

/// Structured field attached to a log event.
pub type LogField = (&'static str, String);

/// Where the handler reports its decisions. Injected instead of a global
/// logger so tests can capture exactly what was emitted.
pub trait EventSink: Send + Sync {
    fn log_event(&self, level: LogLevel, message: &str, fields: &[LogField]);
}
