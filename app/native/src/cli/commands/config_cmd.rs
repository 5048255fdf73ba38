//! Config CLI commands.
//!
//! Commands for managing the ZoneRouter configuration file.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use colored::Colorize;

use crate::config::{
    ZoneConfig, config_paths, default_config_path, drops_comments_on_save, save_config,
};
use crate::error::ZoneRouterError;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Write a configuration file with the default settings.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  zonerouter config init                          # Create config at default location
  zonerouter config init --force                  # Overwrite existing config
  zonerouter config init --path ~/zones.json      # Create at custom path"#
    )]
    Init {
        /// Overwrite existing configuration file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the configuration file.
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,
    },

    /// Show the configuration search paths and which one is in use.
    Path,
}

/// Execute config subcommands.
///
/// `custom_path` is the global `--config` flag, used by `init` when no
/// `--path` is given.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cmd: &ConfigCommands, custom_path: Option<&Path>) -> Result<(), ZoneRouterError> {
    match cmd {
        ConfigCommands::Init { force, path } => {
            let target = path.as_deref().or(custom_path).map(Path::to_path_buf);
            init_config(*force, target).map(|_| ())
        }
        ConfigCommands::Path => {
            show_config_path(custom_path);
            Ok(())
        }
    }
}

/// Initialize a new configuration file and return where it was written.
fn init_config(force: bool, custom_path: Option<PathBuf>) -> Result<PathBuf, ZoneRouterError> {
    let config_path = custom_path.or_else(default_config_path).ok_or_else(|| {
        ZoneRouterError::ConfigError(
            "No configuration directory found; pass --path PATH".to_string(),
        )
    })?;

    if config_path.exists() && !force {
        return Err(ZoneRouterError::ConfigError(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        )));
    }

    save_config(&ZoneConfig::default(), &config_path)?;

    println!("Configuration file created at: {}", config_path.display());
    Ok(config_path)
}

/// Show the configuration file path.
fn show_config_path(custom_path: Option<&Path>) {
    if let Some(path) = custom_path {
        let marker = if path.exists() { " (active)" } else { " (missing)" };
        println!("Using --config: {}{}", path.display(), marker.dimmed());
        if let Some(note) = comment_note(path) {
            println!("\n{}", note.yellow());
        }
        return;
    }

    println!("Configuration file search paths (in priority order):\n");

    let mut active = None;
    for (i, path) in config_paths().iter().enumerate() {
        let exists = path.exists();
        let marker = if exists && active.is_none() {
            active = Some(path.clone());
            " (active)"
        } else if exists {
            " (exists)"
        } else {
            ""
        };

        println!("  {}. {}{}", i + 1, path.display(), marker.green());
    }

    match active.as_deref().and_then(comment_note) {
        Some(note) => println!("\n{}", note.yellow()),
        None if active.is_none() => {
            println!("\nNo configuration file found.");
            println!("Run 'zonerouter config init' to create one.");
        }
        None => {}
    }
}

/// Warning shown when edits to the file at `path` would lose its comments.
fn comment_note(path: &Path) -> Option<String> {
    drops_comments_on_save(path).then(|| {
        format!(
            "Note: edits made with zonerouter rewrite {} as plain JSON; comments are not kept.",
            path.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::config::load_config_from_path;

    #[test]
    fn test_init_writes_default_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let written = init_config(false, Some(path.clone())).unwrap();
        assert_eq!(written, path);

        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config, ZoneConfig::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();

        let result = init_config(false, Some(path.clone()));
        assert!(matches!(result, Err(ZoneRouterError::ConfigError(_))));
        assert!(init_config(true, Some(path)).is_ok());
    }

    #[test]
    fn test_comment_note_only_for_jsonc() {
        let note = comment_note(Path::new("/tmp/zonerouter/config.jsonc")).unwrap();
        assert!(note.contains("comments are not kept"));
        assert!(comment_note(Path::new("/tmp/zonerouter/config.json")).is_none());
    }

    #[test]
    fn test_init_uses_global_config_flag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zones.json");

        execute(&ConfigCommands::Init { force: false, path: None }, Some(&path)).unwrap();
        assert!(path.exists());
    }
}
