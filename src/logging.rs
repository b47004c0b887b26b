//! Structured logging setup

use crate::config::LoggingConfig;
use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured filter. Calling this more than once, or
/// after another subscriber was installed (test harnesses do this), is a no-op.
pub fn init_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = build_filter(config);

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true));

        if subscriber.try_init().is_err() {
            tracing::debug!("global tracing subscriber already set, keeping it");
            return;
        }

        tracing::info!(filter = %config.filter, "logging initialized");
    });
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig::default();
        init_logging(&config);
        init_logging(&config);
        assert!(LOGGER_INITIALIZED.get().is_some());
    }

    #[test]
    fn test_invalid_directive_falls_back() {
        let config = LoggingConfig {
            filter: "labqc=notalevel".to_string(),
        };
        // Must not panic on an unusable directive
        let _ = build_filter(&config);
    }
}
