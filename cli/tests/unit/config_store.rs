//! Unit tests for `YamlConfigStore` and the config service.
//!
//! These tests mutate `HOPBOX_CONFIG`, so they run serially.

#![allow(clippy::unwrap_used, clippy::expect_used, unsafe_code)]

use hopbox::application::ports::ConfigStore;
use hopbox::application::services::config_service;
use hopbox::domain::{ConfigError, HopboxConfig};
use hopbox::infra::config::{CONFIG_ENV, YamlConfigStore};
use serial_test::serial;
use tempfile::TempDir;

fn with_config_path<T>(f: impl FnOnce(&std::path::Path) -> T) -> T {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hopbox").join("config.yaml");
    // SAFETY: tests touching this variable are #[serial].
    unsafe { std::env::set_var(CONFIG_ENV, &path) };
    let out = f(&path);
    unsafe { std::env::remove_var(CONFIG_ENV) };
    out
}

#[test]
#[serial]
fn env_var_overrides_path() {
    with_config_path(|path| {
        assert_eq!(YamlConfigStore.path().unwrap(), path);
    });
}

#[test]
#[serial]
fn missing_file_loads_defaults() {
    with_config_path(|_| {
        assert_eq!(YamlConfigStore.load().unwrap(), HopboxConfig::default());
    });
}

#[test]
#[serial]
fn set_value_persists_and_reloads() {
    with_config_path(|path| {
        config_service::set_value(&YamlConfigStore, "instance.type", "t3.large").unwrap();
        config_service::set_value(&YamlConfigStore, "aws.region", "eu-west-1").unwrap();

        let reloaded = YamlConfigStore.load().unwrap();
        assert_eq!(reloaded.instance.instance_type, "t3.large");
        assert_eq!(reloaded.aws.region.as_deref(), Some("eu-west-1"));
        assert!(path.exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(path).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o600);
        }
    });
}

#[test]
#[serial]
fn unknown_key_is_rejected_and_nothing_written() {
    with_config_path(|path| {
        let err = config_service::set_value(&YamlConfigStore, "instance.colour", "red").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::UnknownKey { .. })
        ));
        assert!(!path.exists());
    });
}

#[test]
#[serial]
fn partial_file_fills_in_defaults() {
    with_config_path(|path| {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "network:\n  vpc_tag: staging-vpc\n").unwrap();

        let config = YamlConfigStore.load().unwrap();

        assert_eq!(config.network.vpc_tag, "staging-vpc");
        assert_eq!(config.key_pair.name, "my-key-pair");
        assert_eq!(config.instance.volume_size_gib, 30);
    });
}
