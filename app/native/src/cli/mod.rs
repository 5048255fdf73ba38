//! CLI module for ZoneRouter.
//!
//! The CLI edits the configuration file offline: it lists zones for a given
//! screen size, manages routing rules and zone names, and edits the layout.
//! A running engine reads the same file.

mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;

use crate::error::ZoneRouterError;

/// Runs the CLI.
///
/// Parses command-line arguments and executes the appropriate command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), ZoneRouterError> {
    let cli = Cli::parse();
    cli.execute()
}
