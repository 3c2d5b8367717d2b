//! Leveled logging facade.
//!
//! Library crates log through [`sb_error!`], [`sb_warn!`], [`sb_info!`],
//! [`sb_debug!`] and [`sb_trace!`]. The embedding program decides where the
//! output goes by registering a sink with [`set_log_fn`] and how much of it
//! by calling [`set_max_level`]. Before a sink is registered, output is
//! silently discarded.

use core::fmt;
use core::sync::atomic::{AtomicPtr, AtomicU8, Ordering};

// ---------------------------------------------------------------------------
// Log levels, lower is more severe
// ---------------------------------------------------------------------------

/// Log severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    /// Error: decoding failed or output is unusable.
    Error = 1,
    /// Warning: input deviates from the expected format but was accepted.
    Warn = 2,
    /// Informational: high-level progress messages.
    Info = 3,
    /// Debug: per-shader and per-section diagnostics.
    Debug = 4,
    /// Trace: very verbose, per-record output.
    Trace = 5,
}

impl LogLevel {
    /// Returns the human-readable name (fixed-width for aligned output).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN ",
            Self::Info => "INFO ",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }

    const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::Error),
            2 => Some(Self::Warn),
            3 => Some(Self::Info),
            4 => Some(Self::Debug),
            5 => Some(Self::Trace),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().trim_end())
    }
}

// ---------------------------------------------------------------------------
// Sink and filter
// ---------------------------------------------------------------------------

/// The signature of the global log sink.
pub type LogFn = fn(LogLevel, fmt::Arguments<'_>);

fn null_log(_level: LogLevel, _args: fmt::Arguments<'_>) {}

static LOG_FN: AtomicPtr<()> = AtomicPtr::new(null_log as *mut ());

static MAX_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

/// Registers the global log sink.
///
/// May be called more than once; the latest sink wins. Uses `Release`
/// ordering so subsequent loads see the new function.
pub fn set_log_fn(f: LogFn) {
    LOG_FN.store(f as *mut (), Ordering::Release);
}

/// Sets the most verbose level that reaches the sink. Defaults to
/// [`LogLevel::Info`].
pub fn set_max_level(level: LogLevel) {
    MAX_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Returns the current level filter.
#[must_use]
pub fn max_level() -> LogLevel {
    LogLevel::from_u8(MAX_LEVEL.load(Ordering::Relaxed)).unwrap_or(LogLevel::Info)
}

/// Returns `true` if a message at `level` would reach the sink.
#[must_use]
pub fn enabled(level: LogLevel) -> bool {
    level as u8 <= MAX_LEVEL.load(Ordering::Relaxed)
}

/// Loads the current sink from the atomic pointer.
#[inline]
fn load_log_fn() -> LogFn {
    let ptr = LOG_FN.load(Ordering::Acquire);
    // SAFETY: Only valid `LogFn` pointers (or the initial `null_log`) are
    // ever stored into LOG_FN.
    unsafe { core::mem::transmute::<*mut (), LogFn>(ptr) }
}

/// Implementation detail for [`sb_log!`]. Not public API.
#[doc(hidden)]
pub fn _log(level: LogLevel, args: fmt::Arguments<'_>) {
    if enabled(level) {
        load_log_fn()(level, args);
    }
}

/// Logs a message at the given level.
#[macro_export]
macro_rules! sb_log {
    ($level:expr, $($arg:tt)*) => {
        $crate::log::_log($level, format_args!($($arg)*))
    };
}

/// Logs an error-level message.
#[macro_export]
macro_rules! sb_error {
    ($($arg:tt)*) => { $crate::sb_log!($crate::log::LogLevel::Error, $($arg)*) };
}

/// Logs a warning-level message.
#[macro_export]
macro_rules! sb_warn {
    ($($arg:tt)*) => { $crate::sb_log!($crate::log::LogLevel::Warn, $($arg)*) };
}

/// Logs an info-level message.
#[macro_export]
macro_rules! sb_info {
    ($($arg:tt)*) => { $crate::sb_log!($crate::log::LogLevel::Info, $($arg)*) };
}

/// Logs a debug-level message.
#[macro_export]
macro_rules! sb_debug {
    ($($arg:tt)*) => { $crate::sb_log!($crate::log::LogLevel::Debug, $($arg)*) };
}

/// Logs a trace-level message.
#[macro_export]
macro_rules! sb_trace {
    ($($arg:tt)*) => { $crate::sb_log!($crate::log::LogLevel::Trace, $($arg)*) };
}
