//! # ZC Telemetry
//!
//! Structured logging for the Zodiac Connext deployment tooling.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zc_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//!     // deployments log through `tracing` from here on
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `zodiac-connext` | Service name in log lines |
//! | `ZC_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `ZC_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `ZC_JSON_LOGS` | `false` | JSON lines output |
//! | `ZC_NETWORK` | `local` | Network name |

mod config;
mod logging;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::{build_filter, TracingGuard};

#[doc(hidden)]
pub use tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Installs the global subscriber described by `config`.
///
/// Returns a guard to hold for the lifetime of the application.
///
/// # Errors
///
/// `Config` for a bad filter, `SubscriberInit` when a global subscriber
/// already exists.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let tracing = tracing_setup::init_tracing(&config)?;
    Ok(TelemetryGuard {
        _tracing: tracing,
        config,
    })
}

/// Installs a subscriber for tests; repeated calls are harmless.
pub fn init_test_logging() {
    let config = TelemetryConfig {
        log_level: "warn".to_string(),
        ..TelemetryConfig::default()
    };
    let _ = tracing_setup::init_tracing(&config);
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
    config: TelemetryConfig,
}

impl TelemetryGuard {
    /// Configuration the subscriber was installed with.
    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }
}
