#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("store: {0}")]
    Store(#[from] consumer_api::StoreError),

    #[error("{0}")]
    Api(#[from] consumer_api_server::ApiError),

    #[error("metrics: {0}")]
    Metrics(#[from] consumer_api_server::MetricsError),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),

    #[error("api task: {0}")]
    Join(#[from] tokio::task::JoinError),
}
