/// galaxy_vid Engine - process-wide configuration and logging hub
///
/// Graphics objects are owned by render contexts and logical resources, never
/// by the engine. The engine only holds what every thread shares: the active
/// `Config` and the logger, both behind `RwLock` in static storage.

use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::config::Config;
use crate::error::{Result, Error};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Active configuration (defaults until `Engine::initialize`)
static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

fn config_lock() -> &'static RwLock<Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default()))
}

fn logger_lock() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

// ===== PUBLIC API =====

/// Process-wide engine state
///
/// # Example
///
/// ```no_run
/// use galaxy_vid::vid::{Config, Engine};
///
/// Engine::initialize(Config { dynamic_buffer_count: 3, ..Config::default() })?;
/// assert_eq!(Engine::config().dynamic_buffer_count, 3);
/// Engine::shutdown();
/// # Ok::<(), galaxy_vid::vid::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Install `config` as the active configuration
    ///
    /// May be called again to replace the configuration. Contexts and
    /// resources created earlier keep the values they were built with.
    ///
    /// # Errors
    ///
    /// `InitializationFailed` if the configuration is inconsistent; the previous
    /// configuration stays active.
    pub fn initialize(config: Config) -> Result<()> {
        if let Err(reason) = config.validate() {
            crate::engine_error!("galaxy_vid::Engine", "Invalid configuration: {}", reason);
            return Err(Error::InitializationFailed(reason));
        }

        let app_name = config.app_name.clone();
        let mut lock = config_lock().write()
            .map_err(|_| Error::BackendError("Config lock poisoned".to_string()))?;
        *lock = config;
        drop(lock);

        crate::engine_info!("galaxy_vid::Engine", "Initialized for '{}'", app_name);
        Ok(())
    }

    /// Restore the default configuration and logger
    pub fn shutdown() {
        if let Ok(mut lock) = config_lock().write() {
            *lock = Config::default();
        }
        Self::reset_logger();
    }

    /// Copy of the active configuration
    pub fn config() -> Config {
        config_lock()
            .read()
            .map(|config| config.clone())
            .unwrap_or_default()
    }

    // ===== LOGGING API =====

    /// Replace the logger with a custom implementation
    ///
    /// # Example
    ///
    /// ```no_run
    /// use galaxy_vid::vid::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct Silent;
    /// impl Logger for Silent {
    ///     fn log(&self, _entry: &LogEntry) {}
    /// }
    ///
    /// Engine::set_logger(Silent);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to `DefaultLogger`
    pub fn reset_logger() {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Whether an entry of `severity` would reach the logger
    pub fn is_enabled(severity: LogSeverity) -> bool {
        config_lock()
            .read()
            .map(|config| severity >= config.min_log_severity)
            .unwrap_or(true)
    }

    /// Log without file:line (used by engine_info!, engine_warn!, etc.)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        });
    }

    /// Log with file:line (used by engine_error!)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: Some(file),
            line: Some(line),
        });
    }

    fn dispatch(entry: LogEntry) {
        if !Self::is_enabled(entry.severity) {
            return;
        }
        if let Ok(lock) = logger_lock().read() {
            lock.log(&entry);
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
