//! Process-wide log output

use crate::config::LoggingConfig;

/// Install `env_logger` with the configured default filter
///
/// `RUST_LOG` still takes precedence. Returns `false` when logging is
/// disabled or a logger is already installed.
pub fn init(config: &LoggingConfig) -> bool {
    if !config.enabled {
        return false;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.level.as_str()))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_installs_nothing() {
        let config = LoggingConfig {
            enabled: false,
            ..LoggingConfig::default()
        };
        assert!(!init(&config));
    }

    #[test]
    fn test_second_init_is_harmless() {
        let config = LoggingConfig::default();
        init(&config);
        assert!(!init(&config));
    }
}
