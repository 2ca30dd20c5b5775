//! # aiconnect-telemetry
//!
//! Global `tracing` subscriber setup shared by the AI Connect binaries.
//!
//! Log verbosity follows `RUST_LOG` (default `info`). Output is either a
//! compact human-readable format or one JSON object per line.
//!
//! ```rust,no_run
//! aiconnect_telemetry::init_telemetry("aiconnect").ok();
//! tracing::info!("ready");
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Output format of the global subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" | "compact" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(TelemetryError(format!("unknown log format '{other}'"))),
        }
    }
}

/// Subscriber installation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("telemetry error: {0}")]
pub struct TelemetryError(pub String);

/// Install the text-format subscriber.
pub fn init_telemetry(service_name: &str) -> Result<(), TelemetryError> {
    init_with_format(service_name, LogFormat::Text)
}

/// Install the global subscriber with the given format.
///
/// Returns an error if a global subscriber is already installed, so calling
/// it twice is harmless when the result is ignored.
pub fn init_with_format(service_name: &str, format: LogFormat) -> Result<(), TelemetryError> {
    let filter = env_filter();
    let result = match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .compact()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    result.map_err(|e| TelemetryError(e.to_string()))?;

    tracing::debug!(service.name = service_name, ?format, "telemetry initialized");
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_log_formats() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Text ".parse::<LogFormat>().unwrap(), LogFormat::Text);
        let err = "xml".parse::<LogFormat>().unwrap_err();
        assert_eq!(err.to_string(), "telemetry error: unknown log format 'xml'");
    }

    #[test]
    fn log_format_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LogFormat::Json).unwrap(), "\"json\"");
    }

    #[test]
    fn second_init_reports_error() {
        let first = init_telemetry("test-service");
        let second = init_telemetry("test-service");
        // Another test may have installed the subscriber first.
        assert!(first.is_ok() || second.is_err());
        assert!(second.is_err());
    }
}
