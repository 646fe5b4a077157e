//! Logging for the sound board driver
//!
//! Two layers live here. [`init_logging`] installs a process-wide
//! `tracing` subscriber for applications that don't bring their own.
//! [`DebugLog`] is the per-board switch for the chatty per-command trace
//! (every command sent, every reply read); each [`Soundboard`] carries its own,
//! so one noisy board doesn't turn on tracing for every other board in the
//! process.
//!
//! [`Soundboard`]: crate::Soundboard

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Emit a `debug!` event only if the board's [`DebugLog`] is on
macro_rules! board_debug {
    ($log:expr, $($arg:tt)+) => {
        if $log.is_enabled() {
            tracing::debug!($($arg)+);
        }
    };
}

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber is installed
    Silent,
    /// Compact stderr output
    Development,
    /// Verbose output with source locations
    Debug,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
}

/// Install a global subscriber for the given mode
///
/// # Environment Variables
///
/// - `SOUNDBOARD_LOG_LEVEL`: filter directive, e.g. `soundboard_sdk=debug`
/// - `RUST_LOG`: used when `SOUNDBOARD_LOG_LEVEL` is unset
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let filter = create_env_filter("info")?;

            Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .compact(),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let filter = create_env_filter("debug")?;

            Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Initialize logging from `SOUNDBOARD_LOG_MODE`
///
/// - "development" -> LoggingMode::Development
/// - "debug" -> LoggingMode::Debug
///
/// Anything else, including an unset variable, is Silent.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var("SOUNDBOARD_LOG_MODE").as_deref() {
        Ok("development") => LoggingMode::Development,
        Ok("debug") => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    };

    init_logging(mode)
}

fn create_env_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    let directive = std::env::var("SOUNDBOARD_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_level.to_string());

    EnvFilter::try_new(&directive).map_err(|e| LoggingError::InvalidFilter(e.to_string()))
}

/// Per-board switch for per-command debug output
///
/// Suppression is separate from the enabled flag so a tight loop can mute
/// itself and then put back whatever the user had chosen.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DebugLog {
    enabled: bool,
    suppressed: bool,
}

impl DebugLog {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            suppressed: false,
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled && !self.suppressed
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn enabled_flag(&self) -> bool {
        self.enabled
    }

    /// Mute output, returning the previous suppression state for [`DebugLog::restore`]
    pub(crate) fn suppress(&mut self) -> bool {
        std::mem::replace(&mut self.suppressed, true)
    }

    pub(crate) fn restore(&mut self, previous: bool) {
        self.suppressed = previous;
    }
}
