// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the Tomahawk configuration system.

use std::time::Duration;

use tomahawk_config::diagnostic::ConfigError;
use tomahawk_config::model::TomahawkConfig;
use tomahawk_config::{load_and_validate_str, load_config, load_config_from_path, load_config_from_str};

#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[app]
log_level = "debug"
data_dir = "/var/lib/tomahawk"

[plugins]
install_prefix = "/opt/tomahawk"
extra_dirs = ["/home/me/plugins"]
bundle_fallback = false

[accounts]
retry_delay_secs = 30
store_file = "/tmp/accounts.toml"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.app.log_level, "debug");
    assert_eq!(config.app.data_dir.as_deref(), Some("/var/lib/tomahawk"));
    assert_eq!(config.plugins.install_prefix.as_deref(), Some("/opt/tomahawk"));
    assert_eq!(config.plugins.extra_dirs, vec!["/home/me/plugins"]);
    assert_eq!(config.plugins.bundle_fallback, Some(false));
    assert_eq!(config.accounts.retry_delay(), Duration::from_secs(30));
    assert_eq!(
        config.account_store_path(),
        std::path::PathBuf::from("/tmp/accounts.toml")
    );
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty config is valid");
    assert_eq!(config.app.log_level, "info");
    assert_eq!(config.accounts.retry_delay_secs, 10);
    assert!(config.plugins.extra_dirs.is_empty());
    assert!(config.plugins.install_prefix.is_none());
}

#[test]
fn store_path_defaults_into_data_dir() {
    let mut config = TomahawkConfig::default();
    config.app.data_dir = Some("/srv/tomahawk".to_string());
    assert_eq!(
        config.account_store_path(),
        std::path::PathBuf::from("/srv/tomahawk/accounts.toml")
    );
}

#[test]
fn unknown_field_produces_suggestion() {
    let toml = r#"
[accounts]
retry_dealy_secs = 5
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey { key, suggestion, .. } => Some((key, suggestion)),
            _ => None,
        })
        .expect("expected an UnknownKey diagnostic");
    assert_eq!(unknown.0, "retry_dealy_secs");
    assert_eq!(unknown.1.as_deref(), Some("retry_delay_secs"));
}

#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[welcome]
show_recent = true
"#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn wrong_type_produces_invalid_type() {
    let toml = r#"
[accounts]
retry_delay_secs = "ten"
"#;
    let errors = load_and_validate_str(toml).expect_err("string is not a u64");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::InvalidType { key, .. } if key.contains("retry_delay_secs")
    )));
}

#[test]
fn validation_runs_after_deserialization() {
    let toml = r#"
[accounts]
retry_delay_secs = 0
"#;
    let errors = load_and_validate_str(toml).expect_err("zero delay is invalid");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
fn env_overrides_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "tomahawk.toml",
            r#"
[accounts]
retry_delay_secs = 20

[plugins]
install_prefix = "/opt/from-file"
"#,
        )?;
        jail.set_env("TOMAHAWK_ACCOUNTS_RETRY_DELAY_SECS", "45");
        jail.set_env("TOMAHAWK_APP_LOG_LEVEL", "warn");

        let config = load_config()?;
        assert_eq!(config.accounts.retry_delay_secs, 45);
        assert_eq!(config.app.log_level, "warn");
        assert_eq!(config.plugins.install_prefix.as_deref(), Some("/opt/from-file"));
        Ok(())
    });
}

#[test]
fn env_overrides_apply_to_an_explicit_path() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("custom.toml", "[plugins]\nbundle_fallback = true\n")?;
        jail.set_env("TOMAHAWK_PLUGINS_BUNDLE_FALLBACK", "false");
        jail.set_env("TOMAHAWK_ACCOUNTS_RETRY_DELAY_SECS", "3");

        let config = load_config_from_path(std::path::Path::new("custom.toml"))?;
        assert_eq!(config.plugins.bundle_fallback, Some(false));
        assert_eq!(config.accounts.retry_delay_secs, 3);
        Ok(())
    });
}

#[test]
fn load_from_explicit_path() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("custom.toml", "[app]\nlog_level = \"trace\"\n")?;
        let config = load_config_from_path(std::path::Path::new("custom.toml"))?;
        assert_eq!(config.app.log_level, "trace");
        Ok(())
    });
}
