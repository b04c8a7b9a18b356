pub mod config;
pub mod error;
pub mod hash;
pub mod metrics;
pub mod model;

use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Shape of log lines written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Plain,
    /// One JSON object per event with an RFC 3339 UTC timestamp.
    Json,
}

/// Installs the global subscriber. `RUST_LOG` wins over `default_filter`.
/// Log lines go to stderr so graph JSON written to stdout stays machine readable.
pub fn init_tracing(default_filter: &str, format: LogFormat) {
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(filter_layer);

    // A second call (tests, embedding hosts) keeps the first subscriber.
    let _ = match format {
        LogFormat::Plain => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
}
