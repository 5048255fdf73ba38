//! Layout CLI commands.
//!
//! Inspect and edit the split points and independent lines that define the
//! zone grid. Every edit makes sure each resulting zone has a definition and
//! writes the configuration back.

use clap::Subcommand;
use colored::Colorize;

use super::types::{ConfigSession, ScreenArgs};
use crate::cli::output;
use crate::error::ZoneRouterError;
use crate::modules::zones::{Point, SplitLayout};

/// Layout subcommands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum LayoutCommands {
    /// Show split points, extra lines and the resulting zone count.
    Show {
        /// Output in JSON format.
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Add a split point. It contributes one vertical and one horizontal line.
    #[command(after_long_help = r#"Examples:
  zonerouter layout add-point 640 360"#)]
    AddPoint { x: f64, y: f64 },

    /// Move an existing split point.
    MovePoint { index: usize, x: f64, y: f64 },

    /// Remove a split point by index.
    RemovePoint { index: usize },

    /// Add an independent vertical line at `x`.
    AddVertical { x: f64 },

    /// Add an independent horizontal line at `y`.
    AddHorizontal { y: f64 },

    /// Remove an independent vertical line by index.
    RemoveVertical { index: usize },

    /// Remove an independent horizontal line by index.
    RemoveHorizontal { index: usize },

    /// Remove every split point and line, leaving one full-screen zone.
    Clear,
}

impl LayoutCommands {
    /// Applies an edit. Returns `None` for `show`, otherwise whether the
    /// layout changed.
    fn apply(&self, layout: &mut SplitLayout) -> Option<bool> {
        let changed = match *self {
            Self::Show { .. } => return None,
            Self::AddPoint { x, y } => {
                layout.add_point(Point::new(x, y));
                true
            }
            Self::MovePoint { index, x, y } => layout.move_point(index, Point::new(x, y)),
            Self::RemovePoint { index } => layout.remove_point(index),
            Self::AddVertical { x } => {
                layout.add_vertical_line(x);
                true
            }
            Self::AddHorizontal { y } => {
                layout.add_horizontal_line(y);
                true
            }
            Self::RemoveVertical { index } => layout.remove_vertical_line(index),
            Self::RemoveHorizontal { index } => layout.remove_horizontal_line(index),
            Self::Clear => {
                layout.clear();
                true
            }
        };
        Some(changed)
    }
}

/// Execute layout subcommands.
///
/// # Errors
///
/// Returns an error for out-of-range indices or if the configuration cannot
/// be saved.
pub fn execute(
    session: &mut ConfigSession,
    cmd: &LayoutCommands,
    screen: &ScreenArgs,
) -> Result<(), ZoneRouterError> {
    let display = screen.display()?;
    let mut layout = session.layout(&display.frame);

    match cmd.apply(&mut layout) {
        None => {
            let LayoutCommands::Show { json } = cmd else {
                return Ok(());
            };
            print_layout(&layout, *json)
        }
        Some(false) => Err(ZoneRouterError::InvalidArguments(
            "Index out of range; run 'zonerouter layout show' to list indices".to_string(),
        )),
        Some(true) => {
            let zone_count = layout.zone_count();
            let rules = session.rules(&layout);
            let path = session.commit(layout, &rules)?;

            println!("{} {} zones", "Layout updated:".green(), zone_count.to_string().bold());
            println!("{}", format!("Saved to {}", path.display()).dimmed());
            Ok(())
        }
    }
}

fn print_layout(layout: &SplitLayout, json: bool) -> Result<(), ZoneRouterError> {
    if json {
        output::print_highlighted_json(&serde_json::to_value(layout)?);
        return Ok(());
    }

    println!("{}", "Split points".bold());
    if layout.split_points.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for (index, point) in layout.split_points.iter().enumerate() {
        println!("  [{index}] ({}, {})", point.x, point.y);
    }

    println!("{}", "Vertical lines".bold());
    if layout.extra_v_lines.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for (index, x) in layout.extra_v_lines.iter().enumerate() {
        println!("  [{index}] x = {x}");
    }

    println!("{}", "Horizontal lines".bold());
    if layout.extra_h_lines.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for (index, y) in layout.extra_h_lines.iter().enumerate() {
        println!("  [{index}] y = {y}");
    }

    println!("\n{} {}", "Zones:".bold(), layout.zone_count());
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::modules::zones::Rect;

    fn session(dir: &TempDir) -> ConfigSession {
        ConfigSession::load(Some(dir.path().join("config.json").as_path())).unwrap()
    }

    #[test]
    fn test_show_does_not_save() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        execute(&mut s, &LayoutCommands::Show { json: false }, &ScreenArgs::default()).unwrap();
        assert!(!dir.path().join("config.json").exists());
    }

    #[test]
    fn test_add_vertical_line_persists_seeded_layout() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        execute(&mut s, &LayoutCommands::AddVertical { x: 1500.0 }, &ScreenArgs::default())
            .unwrap();

        let reloaded = session(&dir);
        assert_eq!(reloaded.config.layout.split_points, vec![Point::new(960.0, 540.0)]);
        assert_eq!(reloaded.config.layout.extra_v_lines, vec![1500.0]);
        assert_eq!(reloaded.config.zones.len(), 6);
    }

    #[test]
    fn test_remove_out_of_range() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let result =
            execute(&mut s, &LayoutCommands::RemoveHorizontal { index: 0 }, &ScreenArgs::default());
        assert!(matches!(result, Err(ZoneRouterError::InvalidArguments(_))));
    }

    #[test]
    fn test_clear_leaves_single_zone() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        execute(&mut s, &LayoutCommands::Clear, &ScreenArgs::default()).unwrap();

        let reloaded = session(&dir);
        assert!(reloaded.config.layout.is_empty());
        assert_eq!(reloaded.config.zones.len(), 1);
        assert_eq!(reloaded.layout(&Rect::new(0.0, 0.0, 1920.0, 1080.0)).zone_count(), 1);
    }

    #[test]
    fn test_move_point() {
        let mut layout = SplitLayout::seeded(&Rect::new(0.0, 0.0, 100.0, 100.0));
        let cmd = LayoutCommands::MovePoint { index: 0, x: 30.0, y: 70.0 };
        assert_eq!(cmd.apply(&mut layout), Some(true));
        assert_eq!(layout.split_points, vec![Point::new(30.0, 70.0)]);
    }
}
