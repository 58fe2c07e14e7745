//! Telemetry initialisation primitives and logging configuration.
//!
//! # Design
//! - Centralises logging setup (fmt or JSON) with a single entry point.
//! - Records the build SHA once to avoid inconsistencies across modules.

use once_cell::sync::OnceCell;
use tracing::{Span, span::Entered};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{TelemetryError, TelemetryResult};

/// Default logging target when `RUST_LOG` is not provided.
pub const DEFAULT_LOG_LEVEL: &str = "info";

static BUILD_SHA: OnceCell<String> = OnceCell::new();

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the tracing subscriber cannot be installed (for example,
/// because another subscriber has already been set globally).
pub fn init_logging(config: &LoggingConfig) -> TelemetryResult<()> {
    // First initialisation wins.
    let _ = BUILD_SHA.set(config.build_sha.to_string());

    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(build_env_filter(config.level))
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(build_env_filter(config.level))
            .with(fmt::layer().with_target(false).with_thread_ids(false))
            .try_init(),
    };
    installed.map_err(|source| TelemetryError::SubscriberInstall { source })
}

/// Access the build SHA recorded during logging initialisation.
#[must_use]
pub fn build_sha() -> &'static str {
    BUILD_SHA.get().map_or("dev", String::as_str)
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Log level string (e.g., `info`, `debug`).
    pub level: &'a str,
    /// Output format selection for the tracing subscriber.
    pub format: LogFormat,
    /// Build identifier recorded in structured logs.
    pub build_sha: &'a str,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::infer(),
            build_sha: option_env!("SFS_BUILD_SHA").unwrap_or("dev"),
        }
    }
}

/// Available output formats for the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit human-readable, pretty-printed logs.
    Pretty,
}

impl LogFormat {
    /// Choose a sensible default for the current build.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Derive the log format from a `LOG_FORMAT`-style value.
///
/// Unknown values fall back to [`LogFormat::infer`]; `None` means "not configured".
#[must_use]
pub fn log_format_from_env(value: Option<&str>) -> Option<LogFormat> {
    value.map(|value| match value.trim().to_ascii_lowercase().as_str() {
        "json" => LogFormat::Json,
        "pretty" => LogFormat::Pretty,
        _ => LogFormat::infer(),
    })
}

/// Guard that keeps the application-level span entered for the lifetime of the process.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the application-level tracing span for the lifetime of the guard.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        let command = command.into();
        let span: &'static Span = Box::leak(Box::new(
            tracing::info_span!("sfs", command = %command, build_sha = %build_sha()),
        ));
        let guard = span.enter();
        Self { _guard: guard }
    }
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
