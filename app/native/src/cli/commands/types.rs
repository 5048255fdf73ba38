//! Shared types for CLI commands.
//!
//! This module contains types that are used across multiple CLI command modules.

use std::path::PathBuf;

use clap::Args;

use crate::config::{self, ZoneConfig, drops_comments_on_save, save_config};
use crate::error::ZoneRouterError;
use crate::modules::zones::{Display, DpiScale, Rect, RuleStore, SplitLayout};

/// Default screen width used when none is given.
pub const DEFAULT_SCREEN_WIDTH: f64 = 1920.0;

/// Default screen height used when none is given.
pub const DEFAULT_SCREEN_HEIGHT: f64 = 1080.0;

/// Screen geometry used to evaluate a layout offline.
#[derive(Args, Debug, Clone, Copy, PartialEq)]
pub struct ScreenArgs {
    /// Screen width in logical units.
    #[arg(long, default_value_t = DEFAULT_SCREEN_WIDTH)]
    pub width: f64,

    /// Screen height in logical units.
    #[arg(long, default_value_t = DEFAULT_SCREEN_HEIGHT)]
    pub height: f64,

    /// Display scale factor used to convert zones to device pixels.
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,
}

impl Default for ScreenArgs {
    fn default() -> Self {
        Self {
            width: DEFAULT_SCREEN_WIDTH,
            height: DEFAULT_SCREEN_HEIGHT,
            scale: 1.0,
        }
    }
}

impl ScreenArgs {
    /// Validates the geometry and turns it into a display.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneRouterError::InvalidArguments`] for non-positive or
    /// non-finite sizes.
    pub fn display(&self) -> Result<Display, ZoneRouterError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(self.width) || !valid(self.height) {
            return Err(ZoneRouterError::InvalidArguments(format!(
                "Invalid screen size {}x{}",
                self.width, self.height
            )));
        }
        Ok(Display::new(
            Rect::new(0.0, 0.0, self.width, self.height),
            DpiScale::uniform(self.scale),
        ))
    }
}

/// A configuration loaded for editing from the command line.
///
/// An empty layout is seeded the same way the running engine seeds it, so
/// the zone ids shown and accepted by the CLI match the ones at runtime.
#[derive(Debug)]
pub struct ConfigSession {
    pub config: ZoneConfig,
    pub path: Option<PathBuf>,
}

impl ConfigSession {
    /// Loads the configuration from `custom_path` or the default search paths.
    ///
    /// A missing file starts from the defaults. A file that exists but cannot
    /// be read or parsed is an error, so a later save never replaces it.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneRouterError::ConfigError`] if the file is unreadable or
    /// invalid.
    pub fn load(custom_path: Option<&std::path::Path>) -> Result<Self, ZoneRouterError> {
        let (mut config, path) = config::load_existing(custom_path)?;
        config.normalize();
        Ok(Self { config, path })
    }

    /// The layout in effect on `screen`.
    #[must_use]
    pub fn layout(&self, screen: &Rect) -> SplitLayout { self.config.effective_layout(screen) }

    /// Rule store with a definition for every zone of `layout`.
    #[must_use]
    pub fn rules(&self, layout: &SplitLayout) -> RuleStore {
        let mut rules = RuleStore::from_config(&self.config.zones, &self.config.rules);
        rules.ensure_zones(layout.zone_count());
        rules
    }

    /// Stores `layout` and `rules` and writes the configuration back.
    ///
    /// The layout is always stored so a seeded layout stays in effect once
    /// zone definitions exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be saved.
    pub fn commit(
        &mut self,
        layout: SplitLayout,
        rules: &RuleStore,
    ) -> Result<PathBuf, ZoneRouterError> {
        let (zones, title_rules) = rules.to_config();
        self.config.layout = layout;
        self.config.zones = zones;
        self.config.rules = title_rules;
        self.save()
    }

    /// Writes the configuration back.
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration path is known or the file cannot
    /// be written.
    pub fn save(&self) -> Result<PathBuf, ZoneRouterError> {
        let path = self.path.clone().ok_or_else(|| {
            ZoneRouterError::ConfigError(
                "No configuration directory found; pass --config PATH".to_string(),
            )
        })?;
        if drops_comments_on_save(&path) {
            tracing::warn!(
                path = %path.display(),
                "config: rewriting JSONC as plain JSON, comments are not kept"
            );
        }
        save_config(&self.config, &path)?;
        Ok(path)
    }
}
