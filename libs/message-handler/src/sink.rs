use std::sync::Mutex;

use consumer_api::{EventSink, LogField, LogLevel};

// ═══════════════════════════════════════════════════════════════
//  TracingSink
// ═══════════════════════════════════════════════════════════════

/// Forwards handler events to `tracing`.
///
/// Handler field names become real tracing fields, so the JSON formatter
/// emits them as separate keys. Any other field lands in `extra` (`k=v k=v`).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

pub(crate) const KNOWN_FIELDS: &[&str] = &[
    "topic",
    "body_len",
    "metadata_keys",
    "player_id",
    "metadata_player_id",
    "payload_player_id",
    "namespace",
    "key",
    "category",
    "store_kind",
    "error",
];

struct DisplayFields<'a>(&'a [&'a LogField]);

impl std::fmt::Display for DisplayFields<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

fn field<'a>(fields: &'a [LogField], name: &str) -> Option<&'a str> {
    fields.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
}

macro_rules! emit {
    ($level:ident, $fields:expr, $extra:expr, $message:expr) => {
        tracing::$level!(
            topic = field($fields, "topic"),
            body_len = field($fields, "body_len"),
            metadata_keys = field($fields, "metadata_keys"),
            player_id = field($fields, "player_id"),
            metadata_player_id = field($fields, "metadata_player_id"),
            payload_player_id = field($fields, "payload_player_id"),
            namespace = field($fields, "namespace"),
            key = field($fields, "key"),
            category = field($fields, "category"),
            store_kind = field($fields, "store_kind"),
            error = field($fields, "error"),
            extra = $extra,
            "{}",
            $message
        )
    };
}

impl EventSink for TracingSink {
    fn log_event(&self, level: LogLevel, message: &str, fields: &[LogField]) {
        let unknown: Vec<&LogField> = fields
            .iter()
            .filter(|(k, _)| !KNOWN_FIELDS.contains(k))
            .collect();
        let extra = (!unknown.is_empty()).then(|| tracing::field::display(DisplayFields(&unknown)));
        match level {
            LogLevel::Debug => emit!(debug, fields, extra, message),
            LogLevel::Info => emit!(info, fields, extra, message),
            LogLevel::Warn => emit!(warn, fields, extra, message),
            LogLevel::Error => emit!(error, fields, extra, message),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  CaptureSink
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    pub level: LogLevel,
    pub message: String,
    pub fields: Vec<LogField>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
    }
}

/// Keeps every event in memory, in emission order. For tests.
#[derive(Debug, Default)]
pub struct CaptureSink {
    events: Mutex<Vec<CapturedEvent>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }

    /// First event with exactly this message.
    pub fn find(&self, message: &str) -> Option<CapturedEvent> {
        self.events().into_iter().find(|e| e.message == message)
    }
}

impl EventSink for CaptureSink {
    fn log_event(&self, level: LogLevel, message: &str, fields: &[LogField]) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(CapturedEvent {
                level,
                message: message.to_string(),
                fields: fields.to_vec(),
            });
    }
}
