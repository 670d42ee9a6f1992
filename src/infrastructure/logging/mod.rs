//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber. Events go to
//! stderr so stdout stays clean for command output (tables, JSON).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::domain::models::LoggingConfig;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured level when set. Safe to call once
/// per process; later calls are ignored.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        let _ = registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init();
    } else {
        let _ = registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init();
    }
}
