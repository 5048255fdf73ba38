//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments, organized into
//! domain-specific submodules:
//!
//! - `config_cmd` - Configuration file management
//! - `layout` - Split point and line editing
//! - `types` - Shared types used across commands
//! - `zones` - Zone, rule and rename commands

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::cli::output;
use crate::config;
use crate::error::ZoneRouterError;

pub mod config_cmd;
pub mod layout;
pub mod types;
pub mod zones;

pub use config_cmd::ConfigCommands;
pub use layout::LayoutCommands;
use types::{ConfigSession, ScreenArgs};

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// ZoneRouter CLI - manage zones and routing rules.
#[derive(Parser, Debug)]
#[command(name = "zonerouter")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// List the zones produced by the current layout.
    Zones {
        /// Output in JSON format.
        #[arg(long, short = 'j')]
        json: bool,

        #[command(flatten)]
        screen: ScreenArgs,
    },

    /// List the routing rules in lookup order.
    Rules {
        /// Output in JSON format.
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Route a process to a zone.
    ///
    /// Without `--title` every window of the process goes to the zone and
    /// any other rule for the process is replaced.
    #[command(after_long_help = r#"Examples:
  zonerouter assign slack 2
  zonerouter assign chrome 3 --title YouTube"#)]
    Assign {
        /// Process name, matched case-insensitively.
        process: String,

        /// Target zone id.
        zone: u32,

        /// Only route windows whose title contains this text.
        #[arg(long, short)]
        title: Option<String>,
    },

    /// Forget every rule for a process.
    Unassign {
        /// Process name, matched case-insensitively.
        process: String,
    },

    /// Give a zone a display name.
    Rename {
        /// Zone id.
        zone: u32,

        /// New display name.
        name: String,
    },

    /// Inspect and edit the zone layout.
    Layout {
        #[command(subcommand)]
        command: LayoutCommands,

        #[command(flatten)]
        screen: ScreenArgs,
    },

    /// Configuration file management commands.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output the configuration JSON Schema.
    ///
    /// Can be redirected to a file for use with editors that support JSON
    /// Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(zonerouter completions --shell zsh)"
    ///   zonerouter completions --shell fish > ~/.config/fish/completions/zonerouter.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), ZoneRouterError> {
        let custom_path = self.config.as_deref();

        match &self.command {
            Commands::Zones { json, screen } => {
                zones::execute_zones(&ConfigSession::load(custom_path)?, screen, *json)
            }
            Commands::Rules { json } => {
                zones::execute_rules(&ConfigSession::load(custom_path)?, *json)
            }
            Commands::Assign { process, zone, title } => zones::execute_assign(
                &mut ConfigSession::load(custom_path)?,
                process,
                *zone,
                title.as_deref(),
            ),
            Commands::Unassign { process } => {
                zones::execute_unassign(&mut ConfigSession::load(custom_path)?, process)
            }
            Commands::Rename { zone, name } => {
                zones::execute_rename(&mut ConfigSession::load(custom_path)?, *zone, name)
            }
            Commands::Layout { command, screen } => {
                layout::execute(&mut ConfigSession::load(custom_path)?, command, screen)
            }
            Commands::Config(cmd) => config_cmd::execute(cmd, custom_path),
            Commands::Schema => {
                output::print_highlighted_json(&config::schema());
                Ok(())
            }
            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "zonerouter", &mut io::stdout());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // CLI parsing tests
    // ========================================================================

    #[test]
    fn test_cli_definition_is_valid() { Cli::command().debug_assert(); }

    #[test]
    fn test_cli_parses_zones_with_screen() {
        let cli = Cli::try_parse_from([
            "zonerouter",
            "zones",
            "--json",
            "--width",
            "2560",
            "--height",
            "1440",
            "--scale",
            "1.5",
        ])
        .unwrap();

        match cli.command {
            Commands::Zones { json, screen } => {
                assert!(json);
                assert_eq!(screen, ScreenArgs { width: 2560.0, height: 1440.0, scale: 1.5 });
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_zones_defaults_screen() {
        let cli = Cli::try_parse_from(["zonerouter", "zones"]).unwrap();
        match cli.command {
            Commands::Zones { json, screen } => {
                assert!(!json);
                assert_eq!(screen, ScreenArgs::default());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_assign_with_title() {
        let cli =
            Cli::try_parse_from(["zonerouter", "assign", "chrome", "3", "--title", "YouTube"])
                .unwrap();
        match cli.command {
            Commands::Assign { process, zone, title } => {
                assert_eq!(process, "chrome");
                assert_eq!(zone, 3);
                assert_eq!(title.as_deref(), Some("YouTube"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_non_numeric_zone() {
        assert!(Cli::try_parse_from(["zonerouter", "assign", "chrome", "two"]).is_err());
    }

    #[test]
    fn test_cli_parses_layout_subcommand() {
        let cli = Cli::try_parse_from(["zonerouter", "layout", "add-point", "640", "360"]).unwrap();
        match cli.command {
            Commands::Layout { command: LayoutCommands::AddPoint { x, y }, .. } => {
                assert!((x - 640.0).abs() < f64::EPSILON);
                assert!((y - 360.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_global_config_flag() {
        let cli =
            Cli::try_parse_from(["zonerouter", "rules", "--config", "/tmp/zones.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/zones.json")));
    }

    #[test]
    fn test_cli_parses_config_init() {
        let cli = Cli::try_parse_from(["zonerouter", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommands::Init { force: true, path: None })
        ));
    }

    #[test]
    fn test_cli_parses_completions() {
        let cli = Cli::try_parse_from(["zonerouter", "completions", "--shell", "zsh"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions { shell: Shell::Zsh }));
    }

    #[test]
    fn test_cli_requires_subcommand() { assert!(Cli::try_parse_from(["zonerouter"]).is_err()); }

    // ========================================================================
    // Execution tests
    // ========================================================================

    #[test]
    fn test_execute_assign_writes_custom_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("zones.json");
        let path_arg = path.to_string_lossy().to_string();

        let cli =
            Cli::try_parse_from(["zonerouter", "--config", &path_arg, "assign", "slack", "2"])
                .unwrap();
        cli.execute().unwrap();

        let saved = config::load_config_from_path(&path).unwrap();
        assert!(saved.zones.iter().any(|z| z.zone_id == 2 && z.process_names == ["slack"]));
    }

    #[test]
    fn test_execute_edit_fails_on_unparsable_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("zones.json");
        let broken = r#"{"zones": [{"zoneId": 2, "processNames": ["outlook"]},]}"#;
        std::fs::write(&path, broken).unwrap();
        let path_arg = path.to_string_lossy().to_string();

        let cli =
            Cli::try_parse_from(["zonerouter", "--config", &path_arg, "assign", "slack", "2"])
                .unwrap();
        assert!(matches!(cli.execute(), Err(ZoneRouterError::ConfigError(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), broken);
    }
}
