pub mod metrics;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use consumer_api::InboundMessage;
use message_handler::{Ack, ErrorKind, HandlerError, MessageHandler};

pub use metrics::{MetricsError, RequestMetrics};

/// Method label used for metrics and call logs.
pub const ON_MESSAGE: &str = "OnMessage";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bind api :{port}: {source}")]
    Bind { port: u16, source: std::io::Error },

    #[error("axum serve: {0}")]
    Serve(std::io::Error),
}

#[derive(Clone)]
struct AppState {
    handler: Arc<MessageHandler>,
    metrics: Arc<RequestMetrics>,
}

/// Routes: `POST /v1/messages`, `GET /healthz`, `GET /metrics`.
pub fn router(handler: Arc<MessageHandler>, metrics: Arc<RequestMetrics>) -> Router {
    let state = AppState { handler, metrics };
    Router::new()
        .route("/v1/messages", post(handle_on_message))
        .route("/healthz", get(handle_health))
        .route("/metrics", get(handle_metrics))
        .with_state(state)
}

/// Bind the API listener on `0.0.0.0:{port}`. Separate from [`serve`] so a
/// bind failure stops startup before anything is spawned.
pub async fn bind(port: u16) -> Result<tokio::net::TcpListener, ApiError> {
    tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|source| ApiError::Bind { port, source })
}

/// Serve on an already bound listener until `shutdown` fires.
pub async fn serve(
    listener: tokio::net::TcpListener,
    handler: Arc<MessageHandler>,
    metrics: Arc<RequestMetrics>,
    shutdown: CancellationToken,
) -> Result<(), ApiError> {
    axum::serve(listener, router(handler, metrics))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(ApiError::Serve)
}

// ═══════════════════════════════════════════════════════════════
//  POST /v1/messages
// ═══════════════════════════════════════════════════════════════

fn outcome_label(result: &Result<Ack, HandlerError>) -> &'static str {
    match result {
        Ok(Ack::Persisted { .. }) => "persisted",
        Ok(Ack::Skipped(_)) => "skipped",
        Err(e) => match e.kind() {
            ErrorKind::DecodeFailure => "decode_failure",
            ErrorKind::StoreFailure => "store_failure",
        },
    }
}

fn error_response(err: &HandlerError) -> Response {
    match err {
        HandlerError::Decode(e) => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": {
                    "kind": err.kind().to_string(),
                    "category": e.category().to_string(),
                    "message": e.to_string(),
                }
            })),
        )
            .into_response(),
        HandlerError::Store(e) => (
            StatusCode::BAD_GATEWAY,
            axum::Json(json!({
                "error": {
                    "kind": err.kind().to_string(),
                    "store_kind": e.kind().to_string(),
                    "message": e.message(),
                }
            })),
        )
            .into_response(),
    }
}

async fn handle_on_message(
    State(state): State<AppState>,
    payload: Result<axum::Json<InboundMessage>, JsonRejection>,
) -> Response {
    let axum::Json(message) = match payload {
        Ok(m) => m,
        Err(rejection) => {
            state.metrics.record(ON_MESSAGE, "invalid_request");
            tracing::warn!(method = ON_MESSAGE, error = %rejection.body_text(), "rejected call");
            return (
                rejection.status(),
                axum::Json(json!({
                    "error": { "kind": "invalid_request", "message": rejection.body_text() }
                })),
            )
                .into_response();
        }
    };

    let started = Instant::now();
    let result = state.handler.on_message(&message).await;
    let elapsed = started.elapsed();
    let outcome = outcome_label(&result);
    state.metrics.record(ON_MESSAGE, outcome);
    state.metrics.observe_duration(ON_MESSAGE, elapsed.as_secs_f64());
    tracing::info!(
        method = ON_MESSAGE,
        topic = %message.topic,
        outcome,
        elapsed_ms = elapsed.as_millis() as u64,
        "finished call"
    );

    match result {
        Ok(_) => axum::Json(json!({})).into_response(),
        Err(e) => error_response(&e),
    }
}

// ═══════════════════════════════════════════════════════════════
//  GET /healthz, GET /metrics
// ═══════════════════════════════════════════════════════════════

async fn handle_health() -> impl IntoResponse {
    axum::Json(json!({ "status": "serving" }))
}

async fn handle_metrics(State(state): State<AppState>) -> Response {
    match state.metrics.encode_text() {
        Ok(text) => (
            [(axum::http::header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "metrics encode error");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
