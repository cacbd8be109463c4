use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use storage_http::HttpStoreConfig;

use crate::error::ServerError;

#[derive(Parser)]
#[command(name = "consumer-server", about = "Async messaging consumer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the consumer
    Serve(ServeArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

/// Flags override the TOML file; every flag also reads an env var.
#[derive(Args, Clone, Debug, Default)]
pub struct ServeArgs {
    /// Optional TOML config file
    #[arg(long, env = "CONFIG_PATH")]
    pub config: Option<String>,

    /// Store namespace for persisted records
    #[arg(long, env = "AB_NAMESPACE")]
    pub namespace: Option<String>,

    /// "true" (any case) enables persistence; anything else disables it
    #[arg(long = "store-messages", env = "STORE_MESSAGE_IN_CLOUDSAVE")]
    pub store_messages: Option<String>,

    #[arg(long, env = "API_PORT")]
    pub port: Option<u16>,

    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    #[arg(long, env = "LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,
}

// ---- TOML Config ----

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub persistence_enabled: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub store: StoreConfig,
}

fn default_api_port() -> u16 {
    6565
}
fn default_namespace() -> String {
    "accelbyte".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            namespace: default_namespace(),
            persistence_enabled: false,
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            store: StoreConfig::default(),
        }
    }
}

/// `[store]` table. `kind` picks the backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    #[default]
    Memory,
    Http(HttpStoreSection),
}

impl StoreConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreConfig::Memory => "memory",
            StoreConfig::Http(_) => "http",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpStoreSection {
    pub base_url: String,
    /// Inline token. Prefer `token_env` outside of local runs.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_token_env() -> String {
    "AB_ACCESS_TOKEN".into()
}
fn default_timeout_ms() -> u64 {
    10_000
}

impl HttpStoreSection {
    /// Build the adapter config; the token falls back to `env(token_env)`.
    pub fn resolve(&self, env: impl Fn(&str) -> Option<String>) -> HttpStoreConfig {
        HttpStoreConfig {
            base_url: self.base_url.clone(),
            token: self.token.clone().or_else(|| env(&self.token_env)),
            timeout_ms: self.timeout_ms,
        }
    }
}

/// `STORE_MESSAGE_IN_CLOUDSAVE` semantics: only "true" enables.
pub fn parse_enabled(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

impl ServerConfig {
    pub fn load(path: &str) -> Result<Self, ServerError> {
        let content = std::fs::read_to_string(path).map_err(|e| ServerError::Config {
            context: "read",
            detail: format!("'{path}': {e}"),
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            ServerError::Config { context, detail } => ServerError::Config {
                context,
                detail: format!("'{path}': {detail}"),
            },
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, ServerError> {
        toml::from_str(content).map_err(|e| ServerError::Config {
            context: "parse",
            detail: e.to_string(),
        })
    }

    /// File (if any) first, then flags/env on top.
    pub fn resolve(args: &ServeArgs) -> Result<Self, ServerError> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply(args);
        Ok(config)
    }

    pub fn apply(&mut self, args: &ServeArgs) {
        if let Some(ns) = &args.namespace {
            self.namespace = ns.clone();
        }
        if let Some(flag) = &args.store_messages {
            self.persistence_enabled = parse_enabled(flag);
        }
        if let Some(port) = args.port {
            self.api_port = port;
        }
        if let Some(level) = &args.log_level {
            self.log_level = level.clone();
        }
        if let Some(format) = args.log_format {
            self.log_format = format;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let config = ServerConfig::resolve(&ServeArgs::default()).unwrap();
        assert_eq!(config.api_port, 6565);
        assert_eq!(config.namespace, "accelbyte");
        assert!(!config.persistence_enabled);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.store.kind(), "memory");
    }

    #[test]
    fn parses_http_store_section() {
        let config = ServerConfig::from_toml(
            r#"
            namespace = "game"
            persistence_enabled = true
            log_format = "text"

            [store]
            kind = "http"
            base_url = "https://example.com"
            timeout_ms = 2500
            "#,
        )
        .unwrap();

        assert_eq!(config.namespace, "game");
        assert!(config.persistence_enabled);
        assert_eq!(config.log_format, LogFormat::Text);
        let StoreConfig::Http(section) = &config.store else {
            panic!("expected http store, got {:?}", config.store);
        };
        assert_eq!(section.token_env, "AB_ACCESS_TOKEN");
        assert_eq!(section.timeout_ms, 2500);

        let resolved = section.resolve(|name| {
            (name == "AB_ACCESS_TOKEN").then(|| "from-env".to_string())
        });
        assert_eq!(resolved.base_url, "https://example.com");
        assert_eq!(resolved.token.as_deref(), Some("from-env"));
    }

    #[test]
    fn inline_token_wins_over_env() {
        let section = HttpStoreSection {
            base_url: "http://x".into(),
            token: Some("inline".into()),
            token_env: "AB_ACCESS_TOKEN".into(),
            timeout_ms: 1,
        };
        let resolved = section.resolve(|_| Some("env".into()));
        assert_eq!(resolved.token.as_deref(), Some("inline"));
    }

    #[test]
    fn unknown_store_kind_is_config_error() {
        let err = ServerConfig::from_toml("[store]\nkind = \"s3\"\n").unwrap_err();
        assert!(matches!(err, ServerError::Config { context: "parse", .. }), "{err}");
    }

    #[test]
    fn flags_override_file_values() {
        let mut config = ServerConfig::from_toml("namespace = \"file\"\napi_port = 7000\n").unwrap();
        config.apply(&ServeArgs {
            namespace: Some("flag".into()),
            store_messages: Some("TRUE".into()),
            log_level: Some("warning".into()),
            ..Default::default()
        });
        assert_eq!(config.namespace, "flag");
        assert_eq!(config.api_port, 7000);
        assert!(config.persistence_enabled);
        assert_eq!(config.log_level, "warning");
    }

    #[test]
    fn only_true_enables_persistence() {
        assert!(parse_enabled("true"));
        assert!(parse_enabled(" True "));
        assert!(!parse_enabled("1"));
        assert!(!parse_enabled("yes"));
        assert!(!parse_enabled("false"));
        assert!(!parse_enabled(""));
    }

    #[test]
    fn cli_parses_serve_flags() {
        let cli = Cli::try_parse_from([
            "consumer-server",
            "serve",
            "--namespace",
            "ns1",
            "--store-messages",
            "true",
            "--port",
            "7001",
            "--log-format",
            "text",
        ])
        .unwrap();
        let Commands::Serve(args) = cli.command;
        assert_eq!(args.namespace.as_deref(), Some("ns1"));
        assert_eq!(args.store_messages.as_deref(), Some("true"));
        assert_eq!(args.port, Some(7001));
        assert_eq!(args.log_format, Some(LogFormat::Text));
    }
}
