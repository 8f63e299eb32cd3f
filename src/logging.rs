//! Logging and tracing initialization for xscp.
//!
//! Diagnostics go to stderr so they never mix with results printed on
//! stdout. The audit log is separate and is not written through here.

use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Configuration for the logging system.
#[derive(Debug, Clone, Copy)]
pub struct LogConfig {
    /// Output logs as JSON (for machine parsing)
    pub json: bool,
    /// Enable verbose logging (sets default level to DEBUG)
    pub verbose: bool,
    /// Install a subscriber at all. The interactive menu turns this off
    /// unless verbose, since stderr output would tear the alternate screen.
    pub enabled: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            json: false,
            verbose: false,
            enabled: true,
        }
    }
}

/// Initialize the tracing subscriber with the given configuration.
///
/// The log level can be overridden at runtime via the `RUST_LOG` environment variable.
pub fn init(config: LogConfig) {
    if !config.enabled {
        return;
    }

    let default_level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("xscp={}", default_level.as_str().to_lowercase()))
    });

    if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_current_span(true)
                    .with_target(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .init();
    }
}
