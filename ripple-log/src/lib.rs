//! Ripple Logging
//!
//! Lightweight structured logging shared by the Ripple crates, controlled by
//! the `RIPPLE_DEBUG` family of environment variables.
//!
//! # Features
//!
//! - **Environment-controlled**: `RIPPLE_DEBUG=1` enables debug logging
//! - **Cheap when filtered**: macros check the level before formatting
//! - **Multiple formats**: pretty, compact and JSON output on stderr
//! - **Bridges**: routes the `log` facade through Ripple, and optionally
//!   builds a `tracing` subscriber with the same level
//!
//! # Usage
//!
//! ```rust
//! use ripple_log::{debug, info, trace};
//!
//! debug!("Connecting slot");
//! info!("Published to {} slots", 3);
//! trace!(target: "ripple::event", "Sweep finished");
//! ```
//!
//! # Environment Variables
//!
//! - `RIPPLE_DEBUG=1` - Enable debug logging
//! - `RIPPLE_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `RIPPLE_LOG_FORMAT=pretty|compact|json` - Set output format
//! - `RIPPLE_LOG_TIMESTAMPS=1|0` - Include timestamps
//! - `RIPPLE_LOG_MODULE=1|0` - Include the log target

use once_cell::sync::Lazy;
use std::env;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

// ============================================================================
// Levels and formats
// ============================================================================

/// Log level, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    /// Per-sweep and per-slot detail
    Trace = 0,
    /// Registration and lifecycle changes
    Debug = 1,
    /// Informational messages
    Info = 2,
    /// Recoverable problems
    Warn = 3,
    /// Failures
    Error = 4,
    /// Nothing is logged
    Off = 5,
}

impl Level {
    /// Upper-case level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "off" | "none" => Ok(Level::Off),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => Level::Trace,
            log::Level::Debug => Level::Debug,
            log::Level::Info => Level::Info,
            log::Level::Warn => Level::Warn,
            log::Level::Error => Level::Error,
        }
    }
}

impl From<Level> for log::LevelFilter {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => log::LevelFilter::Trace,
            Level::Debug => log::LevelFilter::Debug,
            Level::Info => log::LevelFilter::Info,
            Level::Warn => log::LevelFilter::Warn,
            Level::Error => log::LevelFilter::Error,
            Level::Off => log::LevelFilter::Off,
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human readable, one field per column
    Pretty,
    /// Single short line
    Compact,
    /// One JSON object per line
    Json,
}

/// Error returned when a format name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log format: {0}")]
pub struct ParseFormatError(pub String);

impl FromStr for Format {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Format::Pretty),
            "compact" => Ok(Format::Compact),
            "json" => Ok(Format::Json),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Warn as u8);

static CONFIG: Lazy<LogConfig> = Lazy::new(|| {
    let config = LogConfig::from_env();
    DEBUG_ENABLED.store(config.debug, Ordering::SeqCst);
    LOG_LEVEL.store(config.level as u8, Ordering::SeqCst);
    config
});

/// Logging configuration, read once from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether debug mode is enabled
    pub debug: bool,
    /// Minimum level written
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Prefix lines with a timestamp
    pub timestamps: bool,
    /// Include the log target
    pub module_path: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Warn,
            format: Format::Compact,
            timestamps: true,
            module_path: true,
        }
    }
}

impl LogConfig {
    /// Build a configuration from `RIPPLE_*` environment variables.
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |key: &str| lookup(key).map(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        let debug = flag("RIPPLE_DEBUG").unwrap_or(defaults.debug);
        let level = lookup("RIPPLE_LOG_LEVEL")
            .and_then(|s| s.parse().ok())
            .unwrap_or(if debug { Level::Debug } else { defaults.level });
        let format = lookup("RIPPLE_LOG_FORMAT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.format);

        Self {
            debug,
            level,
            format,
            timestamps: flag("RIPPLE_LOG_TIMESTAMPS").unwrap_or(defaults.timestamps),
            module_path: flag("RIPPLE_LOG_MODULE").unwrap_or(defaults.module_path),
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Load the configuration from the environment.
///
/// Every level check calls this, so it only matters for callers that want
/// the environment read at a known point.
#[inline]
pub fn init() {
    Lazy::force(&CONFIG);
}

/// The active configuration.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

/// Whether debug mode is on.
#[inline]
pub fn is_debug_enabled() -> bool {
    init();
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Whether messages at `level` are written.
#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    init();
    level != Level::Off && level as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
}

/// Current minimum level.
pub fn current_level() -> Level {
    init();
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Change the minimum level at runtime.
pub fn set_level(level: Level) {
    init();
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
    log::set_max_level(level.into());
}

/// Toggle debug mode at runtime. Turning it on lowers the level to `Debug`.
pub fn set_debug(enabled: bool) {
    init();
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        set_level(Level::Debug);
    }
}

// ============================================================================
// Output
// ============================================================================

#[doc(hidden)]
pub fn emit_record(level: Level, target: &str, args: fmt::Arguments<'_>) {
    let config = config();
    let line = render(config, level, target, &args.to_string());
    let _ = writeln!(std::io::stderr().lock(), "{line}");
}

fn render(config: &LogConfig, level: Level, target: &str, message: &str) -> String {
    match config.format {
        Format::Pretty => {
            let mut line = String::new();
            if config.timestamps {
                line.push_str(&chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f ").to_string());
            }
            line.push_str(&format!("{:5} ", level.as_str()));
            if config.module_path && !target.is_empty() {
                line.push_str(&format!("[{target}] "));
            }
            line.push_str(message);
            line
        }
        Format::Compact => {
            let mut line = String::new();
            if config.timestamps {
                line.push_str(&chrono::Local::now().format("%H:%M:%S ").to_string());
            }
            line.push(level.as_str().chars().next().unwrap_or('?'));
            line.push(' ');
            if config.module_path && !target.is_empty() {
                line.push_str(target);
                line.push_str(": ");
            }
            line.push_str(message);
            line
        }
        Format::Json => render_json(config, level, target, message),
    }
}

#[cfg(feature = "json")]
fn render_json(config: &LogConfig, level: Level, target: &str, message: &str) -> String {
    #[derive(serde::Serialize)]
    struct Line<'a> {
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
        level: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<&'a str>,
        message: &'a str,
    }

    let line = Line {
        timestamp: config.timestamps.then(|| chrono::Utc::now().to_rfc3339()),
        level: level.as_str(),
        target: (config.module_path && !target.is_empty()).then_some(target),
        message,
    };
    serde_json::to_string(&line).unwrap_or_else(|_| message.to_string())
}

#[cfg(not(feature = "json"))]
fn render_json(config: &LogConfig, level: Level, target: &str, message: &str) -> String {
    format!(
        r#"{{"timestamp":"{}","level":"{}","target":"{}","message":"{}"}}"#,
        if config.timestamps { chrono::Utc::now().to_rfc3339() } else { String::new() },
        level.as_str(),
        target.escape_default(),
        message.escape_default()
    )
}

// ============================================================================
// `log` facade bridge
// ============================================================================

struct LogBridge;

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        is_level_enabled(metadata.level().into())
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        emit_record(record.level().into(), record.target(), *record.args());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOG_BRIDGE: LogBridge = LogBridge;

/// Route records from the `log` facade through Ripple's formatter.
///
/// Fails if another `log` implementation was installed first.
pub fn install_log_bridge() -> Result<(), log::SetLoggerError> {
    init();
    log::set_logger(&LOG_BRIDGE)?;
    log::set_max_level(current_level().into());
    Ok(())
}

// ============================================================================
// Macros
// ============================================================================

/// Log at [`Level::Trace`].
#[macro_export]
macro_rules! trace {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::__log!($crate::Level::Trace, $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log!($crate::Level::Trace, module_path!(), $($arg)+)
    };
}

/// Log at [`Level::Debug`]. Also written whenever `RIPPLE_DEBUG` is on.
///
/// ```rust
/// use ripple_log::debug;
///
/// let slots = 4;
/// debug!("Connected {} slots", slots);
/// debug!(target: "ripple::publisher", "Registered key {}", "user.created");
/// ```
#[macro_export]
macro_rules! debug {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_debug_enabled() || $crate::is_level_enabled($crate::Level::Debug) {
            $crate::emit_record($crate::Level::Debug, $target, format_args!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        $crate::debug!(target: module_path!(), $($arg)+)
    };
}

/// Log at [`Level::Info`].
#[macro_export]
macro_rules! info {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::__log!($crate::Level::Info, $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log!($crate::Level::Info, module_path!(), $($arg)+)
    };
}

/// Log at [`Level::Warn`].
#[macro_export]
macro_rules! warn {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::__log!($crate::Level::Warn, $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log!($crate::Level::Warn, module_path!(), $($arg)+)
    };
}

/// Log at [`Level::Error`].
#[macro_export]
macro_rules! error {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::__log!($crate::Level::Error, $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log!($crate::Level::Error, module_path!(), $($arg)+)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:expr, $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($level) {
            $crate::emit_record($level, $target, format_args!($($arg)+));
        }
    };
}

// ============================================================================
// Tracing Integration
// ============================================================================

#[cfg(feature = "tracing")]
pub mod tracing_compat {
    //! Builds a `tracing` subscriber that honours the Ripple level.

    use super::{Level, current_level};

    /// Subscriber filtered by `RUST_LOG` if set, otherwise by the level in
    /// effect when it is built (see [`set_level`](super::set_level)).
    pub fn subscriber() -> impl tracing::Subscriber {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive()));

        tracing_subscriber::registry().with(filter).with(fmt::layer())
    }

    pub(crate) fn default_directive() -> String {
        current_level().as_str().to_ascii_lowercase()
    }
}
