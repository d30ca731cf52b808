use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Trait representing a logger that can log messages at various levels.
///
/// This trait should be implemented by any logger that wants to receive log messages.
/// It is exported via `UniFFI` for use in foreign languages.
///
/// # Examples
///
/// Implementing the `Logger` trait:
///
/// ```rust
/// use singlewave_core::logger::{Logger, LogLevel};
///
/// struct MyLogger;
///
/// impl Logger for MyLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         println!("[SingleWave] [{:?}] {}", level, message);
///     }
/// }
/// ```
///
/// ## Swift
///
/// ```swift
/// class SingleWaveLoggerBridge: SingleWave.Logger {
///     static let shared = SingleWaveLoggerBridge()
///
///     func log(level: SingleWave.LogLevel, message: String) {
///         print("[SingleWave] \(message)")
///     }
/// }
///
/// SingleWave.setLogger(logger: SingleWaveLoggerBridge.shared) // once, before initialize
/// ```
#[uniffi::export(with_foreign)]
pub trait Logger: Sync + Send {
    /// Logs a message at the specified log level.
    fn log(&self, level: LogLevel, message: String);
}

/// Enumeration of possible log levels.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum LogLevel {
    /// Designates very low priority, often extremely detailed messages.
    Trace,
    /// Designates lower priority debugging information.
    Debug,
    /// Designates informational messages that highlight the progress of the application.
    Info,
    /// Designates potentially harmful situations.
    Warn,
    /// Designates error events that might still allow the application to continue running.
    Error,
}

/// Logs an informational SDK message, only when the handle runs in debug mode.
///
/// Messages that must reach the host regardless (failures the integrator has
/// to act on) use `log::warn!`/`log::error!` directly.
macro_rules! sdk_log {
    ($debug:expr, $($arg:tt)+) => {
        if $debug {
            ::log::info!($($arg)+);
        }
    };
}
pub(crate) use sdk_log;

/// Forwards `log` records to the user-provided [`Logger`].
struct ForeignLogger;

impl log::Log for ForeignLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        forwards(
            metadata.level(),
            metadata.target(),
            VERBOSE.load(Ordering::Relaxed),
        )
    }

    fn log(&self, record: &log::Record) {
        let module_path = record.module_path().unwrap_or(record.target());
        if !forwards(record.level(), module_path, VERBOSE.load(Ordering::Relaxed)) {
            return;
        }

        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(log_level(record.level()), format!("{}", record.args()));
        } else {
            eprintln!("Logger not set: {}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Whether a record reaches the foreign logger.
///
/// Warnings and errors always do. Info records only pass while a handle runs
/// in debug mode, and debug/trace records additionally have to come from the
/// SDK itself since dependencies (reqwest, hyper, rustls) are chatty there.
fn forwards(level: log::Level, module_path: &str, verbose: bool) -> bool {
    if level <= log::Level::Warn {
        return true;
    }
    if !verbose {
        return false;
    }
    level == log::Level::Info || module_path.starts_with("singlewave")
}

/// Set from the most recently initialized handle's debug flag.
static VERBOSE: AtomicBool = AtomicBool::new(false);

pub(crate) fn set_verbose(debug: bool) {
    VERBOSE.store(debug, Ordering::Relaxed);
}

const fn log_level(level: log::Level) -> LogLevel {
    match level {
        log::Level::Error => LogLevel::Error,
        log::Level::Warn => LogLevel::Warn,
        log::Level::Info => LogLevel::Info,
        log::Level::Debug => LogLevel::Debug,
        log::Level::Trace => LogLevel::Trace,
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Sets the global logger.
///
/// Call once, before `SingleWave::initialize`. Later calls print a message and
/// keep the first logger. Rust hosts that already install a `log`
/// implementation (e.g. `tracing-subscriber`) do not need this.
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        println!("Logger already set");
    }

    if let Err(e) = init_logger() {
        eprintln!("Failed to set logger: {e}");
    }
}

fn init_logger() -> Result<(), log::SetLoggerError> {
    static LOGGER: ForeignLogger = ForeignLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(log_level(log::Level::Error), LogLevel::Error);
        assert_eq!(log_level(log::Level::Warn), LogLevel::Warn);
        assert_eq!(log_level(log::Level::Trace), LogLevel::Trace);
    }

    #[test]
    fn test_quiet_mode_forwards_only_warnings_and_errors() {
        assert!(forwards(log::Level::Error, "reqwest::connect", false));
        assert!(forwards(log::Level::Warn, "singlewave_core::dispatch", false));
        assert!(!forwards(log::Level::Info, "singlewave_core::client", false));
        assert!(!forwards(log::Level::Debug, "singlewave_core::client", false));
    }

    #[test]
    fn test_debug_mode_forwards_sdk_diagnostics() {
        assert!(forwards(log::Level::Info, "singlewave_core::client", true));
        assert!(forwards(log::Level::Info, "hyper::client", true));
        assert!(forwards(log::Level::Trace, "singlewave_core::dispatch", true));
        assert!(!forwards(log::Level::Debug, "hyper::proto", true));
    }
}
