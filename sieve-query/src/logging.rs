//! Logging setup for sieve.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the application. With the `tracing-subscriber` feature, [`init`] installs
//! one configured from the environment:
//!
//! - `SIEVE_DEBUG=true|1|yes` - Enable debug logging
//! - `SIEVE_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `SIEVE_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! ```rust,no_run
//! use sieve_query::logging;
//!
//! logging::init();
//! ```
//!
//! Per-operand traces of the optimizer are controlled separately, through
//! `debug.log_rewrites` in `sieve.toml`.

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

const DEBUG_VAR: &str = "SIEVE_DEBUG";
const LEVEL_VAR: &str = "SIEVE_LOG_LEVEL";
const FORMAT_VAR: &str = "SIEVE_LOG_FORMAT";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Multi-line human readable output.
    Pretty,
    /// Single-line human readable output.
    Compact,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to JSON.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "pretty" => Self::Pretty,
            "compact" => Self::Compact,
            _ => Self::Json,
        }
    }

    /// Get the format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn resolve_level(requested: Option<&str>, debug: bool) -> &'static str {
    let fallback = if debug { "debug" } else { "warn" };
    match requested.map(str::to_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => fallback,
    }
}

/// Check if `SIEVE_DEBUG` enables debug logging.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR).map(|v| parse_flag(&v)).unwrap_or(false)
}

/// The log level from `SIEVE_LOG_LEVEL`.
///
/// Defaults to "debug" if `SIEVE_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    resolve_level(env::var(LEVEL_VAR).ok().as_deref(), is_debug_enabled())
}

/// The output format from `SIEVE_LOG_FORMAT`.
pub fn get_log_format() -> LogFormat {
    env::var(FORMAT_VAR)
        .map(|f| LogFormat::parse(&f))
        .unwrap_or(LogFormat::Json)
}

/// Install the sieve subscriber.
///
/// Does nothing unless `SIEVE_DEBUG` or `SIEVE_LOG_LEVEL` is set, and only
/// the first call has an effect.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var(LEVEL_VAR).is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let format = get_log_format();
            let filter = EnvFilter::try_new(format!("sieve={},sieve_query={}", level, level))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match format {
                LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
                LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
                LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level, format = format.as_str(), "sieve logging initialized");
            }
        }
    });
}

/// Set `SIEVE_LOG_LEVEL` and call [`init`].
///
/// # Safety
///
/// This function modifies environment variables, which is unsafe in
/// multi-threaded programs. Call this early in your program before
/// spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: Called at program startup before threads are spawned.
    unsafe {
        env::set_var(LEVEL_VAR, level);
    }
    init();
}

/// Set `SIEVE_DEBUG=true` and call [`init`].
///
/// # Safety
///
/// Same caveat as [`init_with_level`].
pub fn init_debug() {
    // SAFETY: Called at program startup before threads are spawned.
    unsafe {
        env::set_var(DEBUG_VAR, "true");
    }
    init();
}

/// Debug event emitted only when `SIEVE_DEBUG` is enabled.
#[macro_export]
macro_rules! sieve_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            $crate::__private::tracing::debug!($($arg)*);
        }
    };
}

/// Trace event emitted only when `SIEVE_DEBUG` is enabled.
#[macro_export]
macro_rules! sieve_trace {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            $crate::__private::tracing::trace!($($arg)*);
        }
    };
}
