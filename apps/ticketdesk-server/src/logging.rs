use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LoggingConfig};

/// Picks the filter directive: `-v` flags win, then `RUST_LOG`, then config.
fn filter_directive(cfg: &LoggingConfig, verbose: u8, rust_log: Option<String>) -> String {
    match verbose {
        0 => rust_log
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| cfg.level.clone()),
        1 => "debug".to_owned(),
        _ => "trace".to_owned(),
    }
}

pub fn init(cfg: &LoggingConfig, verbose: u8) {
    let directive = filter_directive(cfg, verbose, std::env::var("RUST_LOG").ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match cfg.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
    };
    if let Err(e) = result {
        eprintln!("logging already initialized: {e}");
    }
}
