//! Gated logger collaborator
//!
//! A cheap, cloneable handle over the `log` facade. Every clone shares the
//! same `enabled` flag so a whole framework instance can be silenced at once.
//! Logging never panics: with no logger installed the facade is a no-op.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<Level> for log::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Debug => log::Level::Debug,
            Level::Info => log::Level::Info,
            Level::Warn => log::Level::Warn,
            Level::Error => log::Level::Error,
        }
    }
}

/// Logger handle with a shared enabled flag
#[derive(Clone)]
pub struct Logger {
    target: Arc<str>,
    enabled: Arc<AtomicBool>,
}

impl Logger {
    /// Create an enabled logger writing under `target`
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: Arc::from(target.into()),
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Create a logger that starts disabled
    pub fn disabled(target: impl Into<String>) -> Self {
        let logger = Self::new(target);
        logger.set_enabled(false);
        logger
    }

    /// Derive a logger with another target that shares this logger's flag
    pub fn scoped(&self, target: impl Into<String>) -> Self {
        Self {
            target: Arc::from(target.into()),
            enabled: Arc::clone(&self.enabled),
        }
    }

    /// Enable/disable output for this logger and all its clones
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Check if output is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Get the log target
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Log a message at the given level
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.is_enabled() {
            return;
        }
        log::log!(target: &self.target, level.into(), "{}", args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new("trellis")
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("target", &self.target)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_enabled_by_default() {
        let logger = Logger::new("test");
        assert!(logger.is_enabled());
        assert_eq!(logger.target(), "test");
    }

    #[test]
    fn test_clones_share_flag() {
        let logger = Logger::new("test");
        let scoped = logger.scoped("test::child");
        let clone = logger.clone();

        logger.set_enabled(false);
        assert!(!clone.is_enabled());
        assert!(!scoped.is_enabled());
        assert_eq!(scoped.target(), "test::child");
    }

    #[test]
    fn test_logging_without_installed_logger_does_not_panic() {
        let logger = Logger::default();
        logger.debug(format_args!("debug {}", 1));
        logger.info(format_args!("info"));
        logger.warn(format_args!("warn"));
        logger.error(format_args!("error"));

        let disabled = Logger::disabled("quiet");
        disabled.error(format_args!("never emitted"));
        assert!(!disabled.is_enabled());
    }

    #[test]
    fn test_level_conversion() {
        assert_eq!(log::Level::from(Level::Warn), log::Level::Warn);
        assert!(Level::Debug < Level::Error);
    }
}
