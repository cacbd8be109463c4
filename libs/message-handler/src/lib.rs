pub mod codec;
pub mod error;
pub mod key;
pub mod sink;

use std::sync::Arc;

use consumer_api::{
    EventSink, InboundMessage, LogLevel, RecordStore, StorageKey, StorageRecord, StoreError, lookup,
};

pub use error::{DecodeCategory, DecodeError, ErrorKind, HandlerError};
pub use key::{PLAYER_ID_METADATA_KEY, PLAYER_JOINED_KEY_PREFIX, player_joined_key};
pub use sink::{CaptureSink, CapturedEvent, TracingSink};

// ═══════════════════════════════════════════════════════════════
//  Config / outcome
// ═══════════════════════════════════════════════════════════════

/// Process-wide handler settings, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Store namespace every record is written to.
    pub namespace: String,
    /// When false the handler accepts everything and writes nothing.
    pub persistence_enabled: bool,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            namespace: "accelbyte".into(),
            persistence_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Metadata has no `PlayerId` entry.
    NoPlayerId,
    PersistenceDisabled,
}

/// Successful outcome of one `on_message` call. Every variant is the same
/// empty success on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    Skipped(SkipReason),
    Persisted { key: StorageKey },
}

impl Ack {
    pub fn is_persisted(&self) -> bool {
        matches!(self, Ack::Persisted { .. })
    }
}

// ═══════════════════════════════════════════════════════════════
//  MessageHandler
// ═══════════════════════════════════════════════════════════════

/// Consumer entry point: one `on_message` per delivered message.
///
/// Stateless between calls. Per call:
/// `Received → Skip | (Decoded | DecodeFailed) → (Persisted | StoreFailed)`.
/// At most one store write per call, never retried here.
pub struct MessageHandler {
    config: HandlerConfig,
    store: Arc<dyn RecordStore>,
    sink: Arc<dyn EventSink>,
}

impl MessageHandler {
    /// Handler that reports through `tracing`.
    pub fn new(config: HandlerConfig, store: Arc<dyn RecordStore>) -> Self {
        Self {
            config,
            store,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub async fn on_message(&self, message: &InboundMessage) -> Result<Ack, HandlerError> {
        self.sink.log_event(
            LogLevel::Info,
            "received message",
            &[
                ("topic", message.topic.clone()),
                ("body_len", message.body.len().to_string()),
                ("metadata_keys", message.metadata.len().to_string()),
            ],
        );

        // --- Routing ---
        let Some(player_id) = lookup(&message.metadata, PLAYER_ID_METADATA_KEY) else {
            self.sink.log_event(
                LogLevel::Info,
                "no player id in metadata, skipping",
                &[("topic", message.topic.clone())],
            );
            return Ok(Ack::Skipped(SkipReason::NoPlayerId));
        };

        if !self.config.persistence_enabled {
            self.sink.log_event(
                LogLevel::Info,
                "persistence disabled, skipping",
                &[("topic", message.topic.clone()), ("player_id", player_id.to_string())],
            );
            return Ok(Ack::Skipped(SkipReason::PersistenceDisabled));
        }

        // --- Decode ---
        let event = match codec::decode_player_joined(message.body.as_bytes()) {
            Ok(event) => event,
            Err(e) => {
                self.sink.log_event(
                    LogLevel::Warn,
                    "failed to decode message body",
                    &[
                        ("topic", message.topic.clone()),
                        ("player_id", player_id.to_string()),
                        ("category", e.category().to_string()),
                        ("error", e.to_string()),
                    ],
                );
                return Err(e.into());
            }
        };

        // Ключ строится из metadata, payload не сверяется.
        if event.player_id != player_id {
            self.sink.log_event(
                LogLevel::Debug,
                "payload player id differs from metadata",
                &[
                    ("metadata_player_id", player_id.to_string()),
                    ("payload_player_id", event.player_id.clone()),
                ],
            );
        }

        let record = StorageRecord {
            namespace: self.config.namespace.clone(),
            key: player_joined_key(player_id),
            payload: event,
        };

        // --- Persist ---
        self.sink.log_event(
            LogLevel::Info,
            "persisting record",
            &[
                ("namespace", record.namespace.clone()),
                ("key", record.key.to_string()),
            ],
        );

        let value = serde_json::to_value(&record.payload).map_err(StoreError::from)?;
        match self.store.put(&record.namespace, &record.key, value).await {
            Ok(()) => {
                self.sink.log_event(
                    LogLevel::Info,
                    "record persisted",
                    &[
                        ("namespace", record.namespace.clone()),
                        ("key", record.key.to_string()),
                    ],
                );
                Ok(Ack::Persisted { key: record.key })
            }
            Err(e) => {
                self.sink.log_event(
                    LogLevel::Error,
                    "failed to persist record",
                    &[
                        ("namespace", record.namespace.clone()),
                        ("key", record.key.to_string()),
                        ("store_kind", e.kind().to_string()),
                        ("error", e.message().to_string()),
                    ],
                );
                Err(HandlerError::Store(e))
            }
        }
    }
}
