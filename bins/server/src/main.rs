mod config;
mod error;

use clap::Parser;
use config::{Cli, Commands, LogFormat};

mod cmd;

/// Map a `LOG_LEVEL` value onto a tracing filter directive.
///
/// `warning` is `warn`; `fatal` and `panic` have no tracing level and fall
/// back to `error`. Anything unrecognised means `info`.
pub(crate) fn parse_log_level(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" | "fatal" | "panic" => "error",
        _ => "info",
    }
}

/// Install the global subscriber. `RUST_LOG`, when set, wins over `level`.
pub(crate) fn init_tracing(level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| parse_log_level(level).into());
    match format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Serve(args) => cmd::serve::run(args).await,
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
