//! Configuration module for ZoneRouter.
//!
//! This module provides the persisted configuration types plus loading and
//! saving. The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.
//!
//! The engine loads with [`load_or_default`], which never fails hard: a
//! missing, unreadable or invalid file falls back to the default configuration.
//! The CLI loads with [`load_existing`], which only defaults a missing file.

mod types;

use std::path::{Path, PathBuf};

pub use types::{
    ConfigError, DEFAULT_POLL_INTERVAL_MS, MIN_POLL_INTERVAL_MS, TitleRule, ZoneConfig,
    ZoneDefinition, config_paths, default_config_path, default_zone_name, drops_comments_on_save,
    load_config, load_config_from_path, save_config,
};

/// Loads the configuration for editing.
///
/// With `custom_path` set only that file is considered. Otherwise the search
/// paths are checked in order. A missing file yields the defaults. The
/// returned path is where the configuration should be written back to; it is
/// `None` only if no configuration directory can be determined at all.
///
/// # Errors
///
/// Returns `ConfigError::IoError` or `ConfigError::ParseError` if a file
/// exists but cannot be read or parsed.
pub fn load_existing(
    custom_path: Option<&Path>,
) -> Result<(ZoneConfig, Option<PathBuf>), ConfigError> {
    let result = custom_path.map_or_else(load_config, |path| {
        load_config_from_path(path).map(|config| (config, path.to_path_buf()))
    });

    match result {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "config: loaded");
            Ok((config, Some(path)))
        }
        Err(ConfigError::NotFound) => {
            tracing::info!("config: no configuration file found, using defaults");
            let path = custom_path.map(Path::to_path_buf).or_else(default_config_path);
            Ok((ZoneConfig::default(), path))
        }
        Err(err) => Err(err),
    }
}

/// Loads the configuration, falling back to defaults on any error.
///
/// Same lookup as [`load_existing`]. An unreadable or invalid file is
/// logged and replaced by the defaults.
#[must_use]
pub fn load_or_default(custom_path: Option<&Path>) -> (ZoneConfig, Option<PathBuf>) {
    load_existing(custom_path).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "config: failed to load configuration, using defaults");
        let path = custom_path.map(Path::to_path_buf).or_else(default_config_path);
        (ZoneConfig::default(), path)
    })
}

/// JSON schema describing the configuration file.
#[must_use]
pub fn schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(ZoneConfig)).unwrap_or_default()
}
