//! Logging configuration and initialization
//!
//! Structured logging with tracing: compact console output for operators,
//! JSON lines for log aggregation and an optional daily-rotated log file.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Filter directive variable, checked before `RUST_LOG`
pub const LOG_ENV: &str = "FX_LOG";
/// Set to `json` to switch console output to JSON lines
pub const LOG_FORMAT_ENV: &str = "FX_LOG_FORMAT";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Enable console output (default: true)
    pub console_enabled: bool,
    /// Directory for the rotated log file; `None` disables file logging
    pub file_dir: Option<PathBuf>,
    /// Use JSON format for console logs (default: false)
    pub json_format: bool,
    /// Filter used when neither `FX_LOG` nor `RUST_LOG` is set (default: "info")
    pub default_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_enabled: true,
            file_dir: None,
            json_format: false,
            default_level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Resolve the JSON flag against `FX_LOG_FORMAT`
    fn use_json(&self, format_var: Option<&str>) -> bool {
        format_var.map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(self.json_format)
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize the global subscriber.
///
/// Returns the file writer guard when file logging is on; keep it alive for
/// the program duration so buffered lines are flushed.
///
/// # Example
///
/// ```no_run
/// use immersive_fx::telemetry::{init_logging, LogConfig};
///
/// let _guard = init_logging(&LogConfig::default()).expect("Failed to initialize logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let format_var = std::env::var(LOG_FORMAT_ENV).ok();
    let use_json = config.use_json(format_var.as_deref());

    let (file_layer, guard) = match &config.file_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, "immersive-fx.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_enabled = config.console_enabled;
    let json_layer = (console_enabled && use_json).then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });
    let console_layer = (console_enabled && !use_json).then(|| fmt::layer().with_target(true).compact());

    tracing_subscriber::registry()
        .with(env_filter(&config.default_level))
        .with(file_layer)
        .with(json_layer)
        .with(console_layer)
        .try_init()?;

    tracing::info!(
        target: "immersive_fx",
        version = env!("CARGO_PKG_VERSION"),
        json_format = use_json,
        file_enabled = config.file_dir.is_some(),
        "Logging initialized"
    );

    Ok(guard)
}

// Re-export WorkerGuard so callers can store it
pub use tracing_appender::non_blocking::WorkerGuard as LogGuard;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert!(config.console_enabled);
        assert!(config.file_dir.is_none());
        assert!(!config.json_format);
        assert_eq!(config.default_level, "info");
    }

    #[test]
    fn test_format_variable_overrides_config() {
        let config = LogConfig::default();
        assert!(config.use_json(Some("JSON")));
        assert!(!config.use_json(Some("pretty")));
        assert!(!config.use_json(None));

        let json = LogConfig {
            json_format: true,
            ..LogConfig::default()
        };
        assert!(json.use_json(None));
    }
}
