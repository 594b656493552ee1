//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Mirrors the plugin's verbose logging switch; raises the default level
    /// to debug so the expensive round logs become visible
    pub verbose_logging: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "llo".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            verbose_logging: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LLO_SERVICE_NAME`: Service name (default: llo)
    /// - `LLO_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `LLO_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `LLO_VERBOSE_LOGGING`: Enable verbose round logging (default: false)
    pub fn from_env() -> Self {
        let verbose_logging = env::var("LLO_VERBOSE_LOGGING")
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        Self {
            service_name: env::var("LLO_SERVICE_NAME").unwrap_or_else(|_| "llo".to_string()),

            log_level: env::var("LLO_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| default_level(verbose_logging).to_string()),

            json_logs: env::var("LLO_JSON_LOGS")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),

            verbose_logging,
        }
    }

    /// Builder-style override of the verbose switch
    pub fn with_verbose_logging(mut self, verbose_logging: bool) -> Self {
        if verbose_logging && self.log_level == default_level(false) {
            self.log_level = default_level(true).to_string();
        }
        self.verbose_logging = verbose_logging;
        self
    }
}

fn default_level(verbose_logging: bool) -> &'static str {
    if verbose_logging {
        "debug"
    } else {
        "info"
    }
}

fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
