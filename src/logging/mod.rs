//! Structured logging for envelope-ledger
//!
//! Subscriber setup plus the masking helpers every log statement that touches
//! transfer data goes through. Log output goes to stderr so command output
//! on stdout stays machine-readable.

pub mod mask;

pub use mask::mask;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingSettings;

/// Fixed context attached to crypto log lines in place of real values
pub const MASKED_CONTEXT: &str = "TX=????, Account=????, Amount=?, Time=????";

/// Build the filter: `RUST_LOG` if set, otherwise the configured level
fn build_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global subscriber
///
/// Safe to call more than once; later calls are ignored.
pub fn init(settings: &LoggingSettings) {
    let filter = build_filter(settings);

    let result = if settings.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
