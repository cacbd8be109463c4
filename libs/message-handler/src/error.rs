use consumer_api::StoreError;

/// Which failure a handler error represents. This is the only thing a
/// transport needs to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DecodeFailure,
    StoreFailure,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::DecodeFailure => f.write_str("decode_failure"),
            ErrorKind::StoreFailure => f.write_str("store_failure"),
        }
    }
}

/// How serde_json classified a body it could not decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeCategory {
    /// Not valid JSON at all.
    Syntax,
    /// Valid JSON, wrong shape: missing field or wrong type.
    Data,
    /// Input ended in the middle of a value (includes the empty body).
    Eof,
}

impl std::fmt::Display for DecodeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeCategory::Syntax => f.write_str("syntax"),
            DecodeCategory::Data => f.write_str("data"),
            DecodeCategory::Eof => f.write_str("eof"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("decode {target} ({category}): {source}")]
pub struct DecodeError {
    target: &'static str,
    category: DecodeCategory,
    #[source]
    source: serde_json::Error,
}

impl DecodeError {
    pub(crate) fn new(target: &'static str, source: serde_json::Error) -> Self {
        use serde_json::error::Category;
        let category = match source.classify() {
            Category::Data => DecodeCategory::Data,
            Category::Eof => DecodeCategory::Eof,
            // from_slice не делает I/O — остаётся только синтаксис
            Category::Syntax | Category::Io => DecodeCategory::Syntax,
        };
        Self { target, category, source }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn category(&self) -> DecodeCategory {
        self.category
    }
}

/// Failure returned from `MessageHandler::on_message`.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("decode failure: {0}")]
    Decode(#[from] DecodeError),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

impl HandlerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HandlerError::Decode(_) => ErrorKind::DecodeFailure,
            HandlerError::Store(_) => ErrorKind::StoreFailure,
        }
    }
}
