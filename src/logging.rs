//! Tracing setup for Keygate.
//!
//! Output format and default directives come from the `logging` config
//! section; `RUST_LOG` still wins when set so an operator can raise the level
//! without touching config files.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Filter used when neither `RUST_LOG` nor the configured directives parse.
const FALLBACK_FILTER: &str = "keygate=info,tower_http=info";

/// Pick the filter directives: a non-empty `RUST_LOG` first, then config.
fn filter_directives(config: &LoggingConfig, rust_log: Option<String>) -> String {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .unwrap_or_else(|| config.filter.clone())
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    let directives = filter_directives(config, std::env::var("RUST_LOG").ok());

    EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("Ignoring invalid log filter {directives:?} ({e})");
        EnvFilter::new(FALLBACK_FILTER)
    })
}

/// Install the global subscriber.
pub fn init(config: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(build_filter(config));

    match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty().with_target(true)).init(),
    }
}

/// Initialize tracing for tests (human-readable format, no JSON).
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("keygate=debug")
        .try_init();
}
