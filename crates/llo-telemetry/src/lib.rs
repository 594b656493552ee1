//! # llo-telemetry
//!
//! Log output for nodes running the reporting plugin.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use llo_telemetry::{init_tracing, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env().with_verbose_logging(plugin_config.verbose_logging);
//! init_tracing(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LLO_SERVICE_NAME` | `llo` | Service name on every log line |
//! | `LLO_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `LLO_JSON_LOGS` | `false` | JSON output for log shippers |
//! | `LLO_VERBOSE_LOGGING` | `false` | Debug level plus expensive round logs |

mod config;

pub use config::TelemetryConfig;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{directive}': {reason}")]
    Filter { directive: String, reason: String },

    #[error("Failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Build the filter for `config`. `RUST_LOG` overrides the configured level.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Filter {
            directive: config.log_level.clone(),
            reason: e.to_string(),
        })
}

/// Install the global tracing subscriber.
///
/// Fails if the filter is invalid or a global subscriber is already set.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = env_filter(config)?;

    let result = if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_current_span(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    };
    result.map_err(|e| TelemetryError::Init(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        verbose = config.verbose_logging,
        "[llo] Telemetry initialized"
    );
    Ok(())
}
