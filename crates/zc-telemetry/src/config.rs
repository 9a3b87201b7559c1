//! Telemetry configuration from environment variables.

use serde::{Deserialize, Serialize};
use std::env;

/// Logging configuration for the deployment tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Filter directive (trace, debug, info, warn, error or a full `EnvFilter` string)
    pub log_level: String,

    /// Whether to write logs to stdout at all
    pub console_output: bool,

    /// JSON lines instead of human-readable output
    pub json_logs: bool,

    /// Network the tool is pointed at (mainnet, gnosis, local, ...)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "zodiac-connext".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            network: "local".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: zodiac-connext)
    /// - `ZC_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `ZC_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `ZC_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    /// - `ZC_NETWORK`: Network name (default: local)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: env::var("ZC_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: env::var("ZC_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.console_output),

            json_logs: env::var("ZC_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(is_container),

            network: env::var("ZC_NETWORK").unwrap_or(defaults.network),
        }
    }

    /// Configuration for one network, e.g. `for_network("gnosis")`.
    #[must_use]
    pub fn for_network(network: &str) -> Self {
        let mut config = Self::from_env();
        config.network = network.to_string();
        config
    }

    /// Service name qualified by network, as it appears in log lines.
    pub fn full_service_name(&self) -> String {
        format!("{}-{}", self.service_name, self.network)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
