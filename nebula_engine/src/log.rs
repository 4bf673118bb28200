//! Internal logging system for the Nebula engine
//!
//! Every compositor manager reports through this module: GPU object creation,
//! resource streaming transitions, invalidation on resize and content errors.
//!
//! Entries go to the process-wide `Logger` held by `Engine`. The macros take
//! the reporting component first, then `format!` arguments. Only the ERROR
//! macros record the call site.

use std::fmt;
use std::time::SystemTime;
use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};

/// Logger trait for custom logging implementations
///
/// Implement this trait to route engine logs elsewhere (file, in-game console, test capture).
///
/// # Example
///
/// ```no_run
/// use nebula_engine::nebula::log::{Logger, LogEntry};
///
/// struct ConsoleOverlayLogger;
///
/// impl Logger for ConsoleOverlayLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Push to overlay...
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    fn log(&self, entry: &LogEntry);
}

/// One message on its way to the installed logger
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,

    /// Creation time, formatted in local time by `DefaultLogger`
    pub timestamp: SystemTime,

    /// Reporting component, e.g. "nebula::FramebufferManager"
    pub source: String,

    pub message: String,

    /// Call site, set by `engine_error!` and `engine_err!` only
    pub file: Option<&'static str>,
    pub line: Option<u32>,
}

impl LogEntry {
    /// Entry stamped now, without call site
    pub fn new(severity: LogSeverity, source: &str, message: String) -> Self {
        Self {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        }
    }

    pub fn with_location(mut self, file: &'static str, line: u32) -> Self {
        self.file = Some(file);
        self.line = Some(line);
        self
    }

    fn write_line(&self, out: &mut impl fmt::Write, severity: impl fmt::Display, source: impl fmt::Display) -> fmt::Result {
        let datetime: DateTime<Local> = self.timestamp.into();
        write!(out, "[{}] [{}] [{}] {}", datetime.format("%Y-%m-%d %H:%M:%S%.3f"), severity, source, self.message)?;
        match (self.file, self.line) {
            (Some(file), Some(line)) => write!(out, " ({}:{})", file, line),
            _ => Ok(()),
        }
    }
}

/// Uncolored `[timestamp] [SEVERITY] [source] message (file:line)` line
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_line(f, self.severity.label(), &self.source)
    }
}

/// Ordered from most verbose to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-pass and per-frame chatter
    Trace,
    /// GPU object creation, resource loading transitions
    Debug,
    /// Graph builds, invalidation on resize
    Info,
    /// Recoverable content problems (unknown pass type)
    Warn,
    /// Content errors, with file:line details
    Error,
}

impl LogSeverity {
    /// Fixed width label
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }

    fn colored_label(self) -> ColoredString {
        let label = self.label();
        match self {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        }
    }
}

/// Console logger installed until `Engine::set_logger` replaces it
///
/// Prints the `Display` line of each entry to stdout, with the severity
/// colored and the source in bright blue.
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let mut line = String::new();
        if entry.write_line(&mut line, entry.severity.colored_label(), entry.source.bright_blue()).is_ok() {
            println!("{}", line);
        }
    }
}

// ===== LOGGING MACROS =====

/// Shared body of the severity macros below
#[doc(hidden)]
#[macro_export]
macro_rules! engine_log {
    ($severity:ident, $source:expr, $($arg:tt)*) => {
        $crate::nebula::Engine::log(
            $crate::nebula::log::LogSeverity::$severity,
            $source,
            format!($($arg)*)
        )
    };
}

/// ```ignore
/// engine_trace!("nebula::CompositorNodeInstance", "Pass '{}' skipped", name);
/// ```
#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => { $crate::engine_log!(Trace, $source, $($arg)*) };
}

/// ```ignore
/// engine_debug!("nebula::RenderPassManager", "Created render pass {:#010x}", id);
/// ```
#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => { $crate::engine_log!(Debug, $source, $($arg)*) };
}

/// ```ignore
/// engine_info!("nebula::CompositorWorkspaceInstance", "Graph built with {} nodes", count);
/// ```
#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => { $crate::engine_log!(Info, $source, $($arg)*) };
}

/// ```ignore
/// engine_warn!("nebula::CompositorNodeLoader", "Unknown pass type {:#010x}", type_id);
/// ```
#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => { $crate::engine_log!(Warn, $source, $($arg)*) };
}

/// Log an ERROR message with file:line information
///
/// # Example
///
/// ```ignore
/// engine_error!("nebula::FramebufferManager", "Unknown framebuffer {}", id);
/// ```
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::nebula::Engine::log_detailed(
            $crate::nebula::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Log an ERROR and build an `Error::BackendError` carrying the same message
///
/// # Example
///
/// ```ignore
/// return Err(engine_err!("nebula::FramebufferManager", "Unknown framebuffer {}", id));
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::nebula::Engine::log_detailed(
            $crate::nebula::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::nebula::Error::BackendError(message)
    }};
}

/// Log an ERROR and return early with `Err(Error::BackendError(..))`
///
/// # Example
///
/// ```ignore
/// engine_bail!("nebula::CompositorWorkspaceInstance", "Second shadow map pass in node {}", id);
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
