use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use consumer_api::RecordStore;
use consumer_api_server::RequestMetrics;
use message_handler::{HandlerConfig, MessageHandler};
use storage_http::HttpRecordStore;
use storage_memory::MemoryRecordStore;

use crate::config::{ServeArgs, ServerConfig, StoreConfig};
use crate::error::ServerError;

/// How long in-flight calls get to finish after a shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

fn build_store(config: &StoreConfig) -> Result<Arc<dyn RecordStore>, ServerError> {
    match config {
        StoreConfig::Memory => Ok(Arc::new(MemoryRecordStore::new())),
        StoreConfig::Http(section) => {
            let http_cfg = section.resolve(|name| std::env::var(name).ok());
            if http_cfg.token.is_none() {
                tracing::warn!(token_env = %section.token_env, "http store has no token, requests go out unauthenticated");
            }
            Ok(Arc::new(HttpRecordStore::new(http_cfg)?))
        }
    }
}

/// Resolves when Ctrl+C or (on unix) SIGTERM arrives.
async fn shutdown_signal() -> Result<(), ServerError> {
    #[cfg(unix)]
    {
        let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = term.recv() => {}
        }
        Ok(())
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(())
    }
}

pub async fn run(args: ServeArgs) -> Result<(), ServerError> {
    // --- Load config ---
    let config = ServerConfig::resolve(&args)?;
    crate::init_tracing(&config.log_level, config.log_format);
    tracing::info!(config = ?args.config, "starting app server..");

    // --- Record store + handler ---
    let store = build_store(&config.store)?;
    let handler = Arc::new(MessageHandler::new(
        HandlerConfig {
            namespace: config.namespace.clone(),
            persistence_enabled: config.persistence_enabled,
        },
        store,
    ));
    tracing::info!(
        namespace = %config.namespace,
        persistence_enabled = config.persistence_enabled,
        store = config.store.kind(),
        "registered message handler"
    );

    // --- API server ---
    let token = CancellationToken::new();
    let metrics = Arc::new(RequestMetrics::new()?);
    let listener = consumer_api_server::bind(config.api_port).await?;
    let mut api_handle = tokio::spawn(consumer_api_server::serve(
        listener,
        handler,
        metrics,
        token.clone(),
    ));
    tracing::info!(port = config.api_port, "api server (http) listening");
    tracing::info!("app server started");

    // --- Ожидание сигнала или падения API ---
    tokio::select! {
        res = shutdown_signal() => {
            res?;
            tracing::info!("signal received");
        }
        res = &mut api_handle => {
            // API завершился до сигнала: ошибку пробрасываем как есть.
            res??;
            tracing::warn!("api server stopped without a shutdown signal");
            return Ok(());
        }
    }

    token.cancel();

    match tokio::time::timeout(DRAIN_TIMEOUT, &mut api_handle).await {
        Ok(res) => res??,
        Err(_) => {
            tracing::warn!(timeout_s = DRAIN_TIMEOUT.as_secs(), "drain timed out, aborting api server");
            api_handle.abort();
        }
    }

    tracing::info!("shutdown complete");
    Ok(())
}
