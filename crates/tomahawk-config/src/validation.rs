// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::TomahawkConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &TomahawkConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.app.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level `{}` is not one of: {}",
                config.app.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.accounts.retry_delay_secs < 1 {
        errors.push(ConfigError::Validation {
            message: "accounts.retry_delay_secs must be at least 1".to_string(),
        });
    }

    for (i, dir) in config.plugins.extra_dirs.iter().enumerate() {
        if dir.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("plugins.extra_dirs[{i}] must not be empty"),
            });
        }
    }

    if let Some(prefix) = &config.plugins.install_prefix
        && prefix.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "plugins.install_prefix must not be empty when set".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_validation(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&TomahawkConfig::default()).is_ok());
    }

    #[test]
    fn zero_retry_delay_fails_validation() {
        let mut config = TomahawkConfig::default();
        config.accounts.retry_delay_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_validation(&errors, "retry_delay_secs"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = TomahawkConfig::default();
        config.app.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_validation(&errors, "app.log_level"));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = TomahawkConfig::default();
        config.app.log_level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn all_failures_are_collected() {
        let mut config = TomahawkConfig::default();
        config.accounts.retry_delay_secs = 0;
        config.plugins.extra_dirs = vec!["/opt/tomahawk".into(), "  ".into()];
        config.plugins.install_prefix = Some(String::new());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(has_validation(&errors, "extra_dirs[1]"));
        assert!(has_validation(&errors, "install_prefix"));
    }
}
