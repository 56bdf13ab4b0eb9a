//! Severity-filtered diagnostics.
//!
//! Packet operations never panic on misuse; they report through this module
//! and return a sentinel instead. Messages are filtered against a single
//! process-wide threshold before being handed to the [`log`] facade, so the
//! embedding application decides where they end up.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Diagnostic severity, from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl LogLevel {
    /// Converts a raw severity number. Values above `Debug` are rejected.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Emergency),
            1 => Some(Self::Alert),
            2 => Some(Self::Critical),
            3 => Some(Self::Error),
            4 => Some(Self::Warning),
            5 => Some(Self::Notice),
            6 => Some(Self::Info),
            7 => Some(Self::Debug),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "EMERGENCY",
            Self::Alert => "ALERT",
            Self::Critical => "CRITICAL",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Notice => "NOTICE",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }

    /// The closest `log` facade level. The facade has fewer levels, so the
    /// four most severe collapse onto `Error`.
    pub fn to_log_level(self) -> log::Level {
        match self {
            Self::Emergency | Self::Alert | Self::Critical | Self::Error => log::Level::Error,
            Self::Warning => log::Level::Warn,
            Self::Notice | Self::Info => log::Level::Info,
            Self::Debug => log::Level::Debug,
        }
    }

    /// The `log` facade filter that lets every message passing this
    /// threshold through.
    pub fn to_level_filter(self) -> log::LevelFilter {
        self.to_log_level().to_level_filter()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "emergency" => Ok(Self::Emergency),
            "alert" => Ok(Self::Alert),
            "critical" => Ok(Self::Critical),
            "error" => Ok(Self::Error),
            "warning" | "warn" => Ok(Self::Warning),
            "notice" => Ok(Self::Notice),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            other => Err(format!(
                "Unknown log level: {}. Use emergency, alert, critical, error, warning, notice, info or debug",
                other
            )),
        }
    }
}

static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Error as u8);

/// Sets the process-wide severity threshold. Safe to call from any thread.
pub fn set_log_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Returns the current process-wide severity threshold.
pub fn log_level() -> LogLevel {
    LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed)).unwrap_or(LogLevel::Debug)
}

/// Whether a message of `level` passes the current threshold.
#[inline]
pub fn enabled(level: LogLevel) -> bool {
    (level as u8) <= LOG_LEVEL.load(Ordering::Relaxed)
}

/// Emits one diagnostic for `subsystem` if `level` passes the threshold.
///
/// The subsystem becomes the `log` target, and the message is prefixed with
/// the severity name because the facade cannot express all eight levels.
pub fn caer_log(level: LogLevel, subsystem: &str, args: fmt::Arguments<'_>) {
    if !enabled(level) {
        return;
    }

    log::log!(target: subsystem, level.to_log_level(), "{}: {}: {}", level, subsystem, args);
}

/// Shorthand for [`caer_log`] with `format!`-style arguments.
#[macro_export]
macro_rules! caer_log {
    ($level:expr, $subsystem:expr, $($arg:tt)+) => {
        $crate::logging::caer_log($level, $subsystem, format_args!($($arg)+))
    };
}
