use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::{StatusCode, Url};

use consumer_api::{RecordStore, StorageKey, StoreError};

// ═══════════════════════════════════════════════════════════════
//  HttpStoreConfig
// ═══════════════════════════════════════════════════════════════

fn default_timeout_ms() -> u64 {
    10_000
}

/// REST document store settings (`[store]` with `kind = "http"`).
///
/// The bearer token is taken as-is. Obtaining and refreshing it is the
/// deployment's job.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct HttpStoreConfig {
    /// e.g. `https://demo.accelbyte.io`
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

// ═══════════════════════════════════════════════════════════════
//  HttpRecordStore
// ═══════════════════════════════════════════════════════════════

/// Upserts records with
/// `PUT {base_url}/cloudsave/v1/admin/namespaces/{namespace}/records/{key}`.
pub struct HttpRecordStore {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpRecordStore {
    pub fn new(config: HttpStoreConfig) -> Result<Self, StoreError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| StoreError::config(format!("base_url '{}': {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::config(format!(
                "base_url '{}' cannot be a base",
                config.base_url
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| StoreError::config(format!("http client: {e}")))?;
        Ok(Self {
            http,
            base_url,
            token: config.token,
        })
    }

    /// Segments are percent-encoded, so keys with `/` or spaces stay one segment.
    pub fn record_url(&self, namespace: &str, key: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::config("base_url cannot be a base"))?
            .pop_if_empty()
            .extend(["cloudsave", "v1", "admin", "namespaces", namespace, "records", key]);
        Ok(url)
    }
}

fn status_error(status: StatusCode, body: &str) -> StoreError {
    let msg = format!("{status}: {body}");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::permission_denied(msg),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => StoreError::timeout(msg),
        s if s.is_client_error() => StoreError::rejected(msg),
        _ => StoreError::unavailable(msg),
    }
}

fn transport_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::timeout(e.to_string())
    } else {
        StoreError::unavailable(e.to_string())
    }
}

impl RecordStore for HttpRecordStore {
    fn put(
        &self,
        namespace: &str,
        key: &StorageKey,
        value: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        let url = self.record_url(namespace, key.as_str());
        Box::pin(async move {
            let url = url?;
            let mut req = self.http.put(url.clone()).json(&value);
            if let Some(token) = &self.token {
                req = req.bearer_auth(token);
            }

            let resp = req.send().await.map_err(transport_error)?;
            let status = resp.status();
            if status.is_success() {
                tracing::debug!(url = %url, status = %status, "record stored");
                return Ok(());
            }

            let body = resp.text().await.unwrap_or_default();
            Err(status_error(status, &body))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::put;
    use consumer_api::StoreErrorKind;
    use serde_json::json;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured {
        requests: Arc<Mutex<Vec<(String, String, Option<String>, serde_json::Value)>>>,
    }

    async fn spawn_backend(status: AxumStatus, delay: Duration) -> (String, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route(
                "/cloudsave/v1/admin/namespaces/{namespace}/records/{key}",
                put(
                    move |State(c): State<Captured>,
                          Path((namespace, key)): Path<(String, String)>,
                          headers: HeaderMap,
                          axum::Json(body): axum::Json<serde_json::Value>| async move {
                        tokio::time::sleep(delay).await;
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        c.requests.lock().unwrap().push((namespace, key, auth, body));
                        (status, "backend says no")
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), captured)
    }

    fn store(base_url: &str, timeout_ms: u64) -> HttpRecordStore {
        HttpRecordStore::new(HttpStoreConfig {
            base_url: base_url.to_string(),
            token: Some("secret".into()),
            timeout_ms,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn put_sends_document_with_bearer_token() {
        let (url, captured) = spawn_backend(AxumStatus::OK, Duration::ZERO).await;
        let store = store(&url, 5_000);
        let key = StorageKey::new("player_joined_event_", "p1");

        store.put("ns", &key, json!({"playerId": "p1"})).await.unwrap();

        let reqs = captured.requests.lock().unwrap().clone();
        assert_eq!(reqs.len(), 1);
        let (ns, k, auth, body) = &reqs[0];
        assert_eq!(ns, "ns");
        assert_eq!(k, "player_joined_event_p1");
        assert_eq!(auth.as_deref(), Some("Bearer secret"));
        assert_eq!(body, &json!({"playerId": "p1"}));
    }

    #[tokio::test]
    async fn forbidden_maps_to_permission_denied() {
        let (url, _) = spawn_backend(AxumStatus::FORBIDDEN, Duration::ZERO).await;
        let err = store(&url, 5_000)
            .put("ns", &StorageKey::new("k_", "1"), json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::PermissionDenied);
        assert!(err.message().contains("backend says no"), "{err}");
    }

    #[tokio::test]
    async fn bad_request_maps_to_rejected() {
        let (url, _) = spawn_backend(AxumStatus::BAD_REQUEST, Duration::ZERO).await;
        let err = store(&url, 5_000)
            .put("ns", &StorageKey::new("k_", "1"), json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::Rejected);
    }

    #[tokio::test]
    async fn server_error_maps_to_unavailable() {
        let (url, captured) = spawn_backend(AxumStatus::SERVICE_UNAVAILABLE, Duration::ZERO).await;
        let err = store(&url, 5_000)
            .put("ns", &StorageKey::new("k_", "1"), json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::Unavailable);
        assert_eq!(captured.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let (url, _) = spawn_backend(AxumStatus::OK, Duration::from_secs(2)).await;
        let err = store(&url, 100)
            .put("ns", &StorageKey::new("k_", "1"), json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::Timeout);
    }

    #[tokio::test]
    async fn unreachable_backend_is_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = store(&format!("http://{addr}"), 1_000)
            .put("ns", &StorageKey::new("k_", "1"), json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::Unavailable);
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let err = HttpRecordStore::new(HttpStoreConfig {
            base_url: "not a url".into(),
            token: None,
            timeout_ms: 1_000,
        })
        .err()
        .unwrap();
        assert_eq!(err.kind(), StoreErrorKind::Config);
    }

    #[test]
    fn record_url_encodes_segments() {
        let s = store("http://example.com/base/", 1_000);
        let url = s.record_url("my ns", "a/b").unwrap();
        assert_eq!(
            url.as_str(),
            "http://example.com/base/cloudsave/v1/admin/namespaces/my%20ns/records/a%2Fb"
        );
    }
}
