//! Subscriber initialisation
//!
//! - Output goes to stderr; stdout carries command results
//! - `RUST_LOG` overrides the configured level
//! - Compact text or one JSON object per line

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogConfig, LogFormat};

/// Builds the filter: `RUST_LOG` when set, else `nonobvious=<level>`.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nonobvious={}", config.level)))
}

/// Installs the global subscriber.
///
/// Returns false when a subscriber was already installed; the existing one
/// stays in place.
pub fn init_logger(config: &LogConfig) -> bool {
    let registry = tracing_subscriber::registry().with(env_filter(config));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let result = match config.format {
        LogFormat::Compact => registry.with(fmt_layer.compact()).try_init(),
        LogFormat::Json => registry.with(fmt_layer.json()).try_init(),
    };
    result.is_ok()
}
