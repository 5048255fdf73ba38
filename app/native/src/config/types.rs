//! Configuration types for ZoneRouter.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Field names are camelCase; the PascalCase names written by older releases
//! are accepted as aliases so existing files keep loading.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::modules::zones::layout::SplitLayout;
use crate::modules::zones::state::{DEFAULT_OVERLAY_OPACITY, Point, Rect, clamp_opacity};

/// Default interval between window polls, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 400;

/// Lower bound on the poll interval, in milliseconds.
pub const MIN_POLL_INTERVAL_MS: u64 = 50;

/// Persisted identity and rule bucket of a zone.
///
/// A process name appears in at most one zone's `process_names`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoneDefinition {
    /// Zone id as produced by the layout (row-major, starting at 1).
    #[serde(alias = "ZoneId")]
    pub zone_id: u32,

    /// User-facing name shown on zone bars and in the picker.
    #[serde(alias = "DisplayName")]
    pub display_name: String,

    /// Processes routed into this zone regardless of window title.
    #[serde(alias = "ProcessNames")]
    pub process_names: Vec<String>,
}

impl ZoneDefinition {
    /// A definition with the default name `Zone {id}` and no processes.
    #[must_use]
    pub fn with_default_name(zone_id: u32) -> Self {
        Self {
            zone_id,
            display_name: default_zone_name(zone_id),
            process_names: Vec::new(),
        }
    }
}

/// Default display name for a zone id.
#[must_use]
pub fn default_zone_name(zone_id: u32) -> String { format!("Zone {zone_id}") }

/// Persisted rule that also requires a title substring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct TitleRule {
    /// Process name (case-insensitive).
    #[serde(alias = "ProcessName")]
    pub process_name: String,

    /// Title substring (case-insensitive).
    #[serde(alias = "TitleContains")]
    pub title_contains: String,

    /// Target zone.
    #[serde(alias = "ZoneId")]
    pub zone_id: u32,
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoneConfig {
    /// Split geometry.
    #[serde(flatten)]
    pub layout: SplitLayout,

    /// Overlay dim level in `[0, 1]`.
    /// Default: 0.12
    #[serde(alias = "OverlayOpacity")]
    pub overlay_opacity: f64,

    /// Zone definitions, sorted by id.
    #[serde(alias = "Zones")]
    pub zones: Vec<ZoneDefinition>,

    /// Title-refined routing rules.
    #[serde(alias = "Rules")]
    pub rules: Vec<TitleRule>,

    /// Interval between window polls in milliseconds.
    /// Default: 400
    pub poll_interval_ms: u64,

    /// Legacy single split point, x coordinate.
    #[serde(alias = "SplitX", skip_serializing_if = "is_unset")]
    pub split_x: f64,

    /// Legacy single split point, y coordinate.
    #[serde(alias = "SplitY", skip_serializing_if = "is_unset")]
    pub split_y: f64,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_unset(value: &f64) -> bool { *value <= 0.0 }

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            layout: SplitLayout::default(),
            overlay_opacity: DEFAULT_OVERLAY_OPACITY,
            zones: Vec::new(),
            rules: Vec::new(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            split_x: 0.0,
            split_y: 0.0,
        }
    }
}

impl ZoneConfig {
    /// Applies migrations and clamps out-of-range values.
    ///
    /// - A legacy `splitX`/`splitY` pair becomes the only split point when no
    ///   split points are configured.
    /// - Overlay opacity is clamped to `[0, 1]`.
    /// - The poll interval is raised to [`MIN_POLL_INTERVAL_MS`].
    pub fn normalize(&mut self) {
        if self.layout.split_points.is_empty() && self.split_x > 0.0 && self.split_y > 0.0 {
            tracing::debug!(
                x = self.split_x,
                y = self.split_y,
                "config: migrating legacy split point"
            );
            self.layout.split_points.push(Point::new(self.split_x, self.split_y));
        }
        self.split_x = 0.0;
        self.split_y = 0.0;

        self.overlay_opacity = clamp_opacity(self.overlay_opacity);
        self.poll_interval_ms = self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS);
    }

    /// The layout in effect on `screen`.
    ///
    /// A fresh configuration, with no lines and no zone definitions, gets a
    /// single split point in the middle of the screen. Once zones have been
    /// defined an empty layout is one full-screen zone.
    #[must_use]
    pub fn effective_layout(&self, screen: &Rect) -> SplitLayout {
        if self.layout.is_empty() && self.zones.is_empty() {
            SplitLayout::seeded(screen)
        } else {
            self.layout.clone()
        }
    }

    /// Poll interval as a `Duration`.
    #[must_use]
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Errors that can occur while loading or saving the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at ~/.config/zonerouter/config.json \
         or in the platform configuration directory"
    )]
    NotFound,

    /// The configuration file could not be read or written.
    #[error("Failed to access configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Application directory name inside configuration roots.
const APP_DIR_NAME: &str = "zonerouter";

/// Returns the possible configuration file paths in priority order.
///
/// 1. `$XDG_CONFIG_HOME/zonerouter/` if set
/// 2. `~/.config/zonerouter/`
/// 3. the platform configuration directory (`%APPDATA%\zonerouter\` on Windows)
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut dirs_to_check = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        dirs_to_check.push(PathBuf::from(xdg_config).join(APP_DIR_NAME));
    }
    if let Some(home) = dirs::home_dir() {
        dirs_to_check.push(home.join(".config").join(APP_DIR_NAME));
    }
    if let Some(config_dir) = dirs::config_dir() {
        dirs_to_check.push(config_dir.join(APP_DIR_NAME));
    }

    let mut paths = Vec::new();
    for dir in dirs_to_check {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }
    paths
}

/// Path a new configuration file is written to when none exists yet.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.json"))
}

/// Loads the configuration from the first existing search path.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of the expected locations.
/// Returns `ConfigError::IoError` if a configuration file exists but could not be read.
/// Returns `ConfigError::ParseError` if the configuration file contains invalid JSON.
pub fn load_config() -> Result<(ZoneConfig, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            return load_config_from_path(&path).map(|config| (config, path));
        }
    }
    Err(ConfigError::NotFound)
}

/// Loads and normalizes the configuration at `path`.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist, and
/// `IoError`/`ParseError` if it cannot be read or parsed.
pub fn load_config_from_path(path: &Path) -> Result<ZoneConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }
    let file = fs::File::open(path)?;
    // Strip comments from JSONC before parsing
    let reader = json_comments::StripComments::new(file);
    let mut config: ZoneConfig = serde_json::from_reader(reader)?;
    config.normalize();
    Ok(config)
}

/// Whether saving to `path` loses comments the user wrote.
///
/// The file is always written as plain JSON, so comments in a `.jsonc` file
/// do not survive an edit.
#[must_use]
pub fn drops_comments_on_save(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("jsonc"))
}

/// Writes the configuration to `path` atomically, creating parent directories.
///
/// The output is plain JSON; see [`drops_comments_on_save`].
///
/// # Errors
///
/// Returns an error if the directory cannot be created, the file cannot be
/// written, or serialization fails.
pub fn save_config(config: &ZoneConfig, path: &Path) -> Result<(), ConfigError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let json = serde_json::to_string_pretty(config)?;
    let mut file = tempfile::NamedTempFile::new_in(&dir)?;
    std::io::Write::write_all(&mut file, json.as_bytes())?;
    file.persist(path).map_err(|err| ConfigError::IoError(err.error))?;

    tracing::debug!(path = %path.display(), "config: saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_effective_layout_seeds_fresh_config() {
        let screen = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let mut config = ZoneConfig::default();
        assert_eq!(config.effective_layout(&screen).split_points, vec![Point::new(500.0, 400.0)]);

        config.zones.push(ZoneDefinition::with_default_name(1));
        assert!(config.effective_layout(&screen).is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = ZoneConfig::default();
        assert!(config.layout.is_empty());
        assert!(config.zones.is_empty());
        assert!(config.rules.is_empty());
        assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert!((config.overlay_opacity - DEFAULT_OVERLAY_OPACITY).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_deserializes_camel_case() {
        let json = r#"{
            "splitPoints": [{"x": 960, "y": 540}],
            "extraVLines": [400],
            "overlayOpacity": 0.3,
            "zones": [{"zoneId": 2, "displayName": "Editor", "processNames": ["notepad"]}],
            "rules": [{"processName": "chrome", "titleContains": "YouTube", "zoneId": 3}],
            "pollIntervalMs": 250
        }"#;

        let config: ZoneConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.layout.split_points, vec![Point::new(960.0, 540.0)]);
        assert_eq!(config.layout.extra_v_lines, vec![400.0]);
        assert_eq!(config.zones[0].display_name, "Editor");
        assert_eq!(config.zones[0].process_names, vec!["notepad"]);
        assert_eq!(config.rules[0].title_contains, "YouTube");
        assert_eq!(config.poll_interval_ms, 250);
    }

    #[test]
    fn test_config_deserializes_legacy_pascal_case() {
        let json = r#"{
            "SplitPoints": [],
            "OverlayOpacity": 0.2,
            "Zones": [{"ZoneId": 1, "DisplayName": "Main", "ProcessNames": ["code"]}],
            "SplitX": 800,
            "SplitY": 450
        }"#;

        let mut config: ZoneConfig = serde_json::from_str(json).unwrap();
        config.normalize();

        assert_eq!(config.layout.split_points, vec![Point::new(800.0, 450.0)]);
        assert_eq!(config.zones[0].zone_id, 1);
        assert_eq!(config.zones[0].process_names, vec!["code"]);
    }

    #[test]
    fn test_normalize_keeps_existing_points_over_legacy() {
        let mut config = ZoneConfig {
            split_x: 100.0,
            split_y: 100.0,
            ..Default::default()
        };
        config.layout.add_point(Point::new(500.0, 500.0));
        config.normalize();
        assert_eq!(config.layout.split_points, vec![Point::new(500.0, 500.0)]);
        assert!(is_unset(&config.split_x));
    }

    #[test]
    fn test_normalize_clamps_values() {
        let mut config = ZoneConfig {
            overlay_opacity: 3.0,
            poll_interval_ms: 1,
            ..Default::default()
        };
        config.normalize();
        assert!((config.overlay_opacity - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.poll_interval_ms, MIN_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_legacy_fields_are_not_written() {
        let json = serde_json::to_string(&ZoneConfig::default()).unwrap();
        assert!(!json.contains("splitX"));
        assert!(json.contains("splitPoints"));
    }

    #[test]
    fn test_load_config_from_path_strips_comments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.jsonc");
        fs::write(
            &path,
            r#"{
                // one split in the middle
                "splitPoints": [{"x": 960, "y": 540}] /* trailing */
            }"#,
        )
        .unwrap();

        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.layout.split_points.len(), 1);
    }

    #[test]
    fn test_load_config_from_missing_path() {
        let dir = TempDir::new().unwrap();
        let err = load_config_from_path(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound));
    }

    #[test]
    fn test_load_config_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_config_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = ZoneConfig::default();
        config.layout.add_point(Point::new(700.0, 400.0));
        config.zones.push(ZoneDefinition::with_default_name(1));

        save_config(&config, &path).unwrap();
        let loaded = load_config_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_drops_comments_on_save_only_for_jsonc() {
        assert!(drops_comments_on_save(Path::new("/tmp/zonerouter/config.jsonc")));
        assert!(drops_comments_on_save(Path::new("config.JSONC")));
        assert!(!drops_comments_on_save(Path::new("/tmp/zonerouter/config.json")));
        assert!(!drops_comments_on_save(Path::new("config")));
    }

    #[test]
    fn test_config_paths_end_with_file_names() {
        for path in config_paths() {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            assert!(CONFIG_FILE_NAMES.contains(&name.as_str()));
        }
    }

    #[test]
    fn test_default_zone_name() {
        assert_eq!(default_zone_name(7), "Zone 7");
        assert_eq!(ZoneDefinition::with_default_name(3).display_name, "Zone 3");
    }
}
