/// Category of a record store error. Lets the transport pick a status
/// and lets operators tell a misconfigured backend from a flaky one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Invalid store configuration (bad base URL, missing token).
    Config,
    /// Backend unreachable or returned a server-side failure — transient.
    Unavailable,
    /// Credentials rejected (401/403).
    PermissionDenied,
    /// Backend refused the write itself (bad key, bad document).
    Rejected,
    /// Store call did not finish within the adapter's timeout.
    Timeout,
}

impl std::fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreErrorKind::Config => f.write_str("config"),
            StoreErrorKind::Unavailable => f.write_str("unavailable"),
            StoreErrorKind::PermissionDenied => f.write_str("permission_denied"),
            StoreErrorKind::Rejected => f.write_str("rejected"),
            StoreErrorKind::Timeout => f.write_str("timeout"),
        }
    }
}

/// Error returned by every `RecordStore` implementation.
///
/// Carries a `StoreErrorKind` plus the backend's message. `From` impls
/// assign the kind automatically so adapters can use `?`.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreError {
    kind: StoreErrorKind,
    message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, msg: impl Into<String>) -> Self {
        Self { kind, message: msg.into() }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Config, msg)
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unavailable, msg)
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::PermissionDenied, msg)
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Rejected, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Timeout, msg)
    }

    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::rejected(e.to_string())
    }
}
