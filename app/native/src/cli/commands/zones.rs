//! Zone and rule CLI commands.
//!
//! These commands read and edit the configuration file directly. A running
//! engine picks the changes up the next time it loads its configuration.

use colored::Colorize;
use serde::Serialize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use super::types::{ConfigSession, ScreenArgs};
use crate::cli::output;
use crate::error::ZoneRouterError;
use crate::modules::zones::{Rect, RuleStore, SplitLayout};

/// Maximum characters shown for names and filters in tables.
const MAX_LABEL_CHARS: usize = 24;

/// One zone as printed by `zonerouter zones`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneReport {
    pub zone_id: u32,
    pub display_name: String,
    pub rect: Rect,
    pub pixels: Rect,
    pub process_names: Vec<String>,
}

/// Computes the zone report for `screen`.
///
/// # Errors
///
/// Returns an error if the screen geometry is invalid.
pub fn zone_reports(
    session: &ConfigSession,
    screen: &ScreenArgs,
) -> Result<Vec<ZoneReport>, ZoneRouterError> {
    let display = screen.display()?;
    let layout = session.layout(&display.frame);
    let rules = session.rules(&layout);

    Ok(layout
        .zones(&display.frame)
        .into_iter()
        .map(|(zone_id, rect)| ZoneReport {
            zone_id,
            display_name: rules.display_name(zone_id),
            rect,
            pixels: rect.to_pixels(display.scale),
            process_names: rules
                .processes_for_zone(zone_id)
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .collect())
}

/// Execute `zonerouter zones`.
///
/// # Errors
///
/// Returns an error if the screen geometry is invalid.
#[allow(clippy::cast_possible_truncation)]
pub fn execute_zones(
    session: &ConfigSession,
    screen: &ScreenArgs,
    json: bool,
) -> Result<(), ZoneRouterError> {
    #[derive(Tabled)]
    struct ZoneRow {
        #[tabled(rename = "ID")]
        id: u32,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Size")]
        size: String,
        #[tabled(rename = "Position")]
        position: String,
        #[tabled(rename = "Pixels")]
        pixels: String,
        #[tabled(rename = "Processes")]
        processes: String,
    }

    let reports = zone_reports(session, screen)?;

    if json {
        output::print_highlighted_json(&serde_json::to_value(&reports)?);
        return Ok(());
    }

    let rows: Vec<ZoneRow> = reports
        .iter()
        .map(|zone| ZoneRow {
            id: zone.zone_id,
            name: output::truncate(&zone.display_name, MAX_LABEL_CHARS),
            size: format!("{}x{}", zone.rect.width as i64, zone.rect.height as i64),
            position: format!("{}, {}", zone.rect.x as i64, zone.rect.y as i64),
            pixels: format!("{}x{}", zone.pixels.width as i64, zone.pixels.height as i64),
            processes: if zone.process_names.is_empty() {
                "-".dimmed().to_string()
            } else {
                zone.process_names.join(", ")
            },
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::new(2..5)).with(Alignment::right()))
        .to_string();

    println!("{}", format!("Zones ({})", reports.len()).bold());
    println!("{table}");
    Ok(())
}

/// Execute `zonerouter rules`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute_rules(session: &ConfigSession, json: bool) -> Result<(), ZoneRouterError> {
    #[derive(Tabled, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct RuleRow {
        #[tabled(rename = "Process")]
        process_name: String,
        #[tabled(rename = "Title contains")]
        title_contains: String,
        #[tabled(rename = "Zone")]
        zone_id: u32,
        #[tabled(rename = "Zone name")]
        zone_name: String,
    }

    let (_, rules) = editable(session)?;

    let rows: Vec<RuleRow> = rules
        .rules()
        .iter()
        .map(|rule| RuleRow {
            process_name: rule.process_name.clone(),
            title_contains: rule.title_filter.clone().unwrap_or_default(),
            zone_id: rule.zone_id,
            zone_name: rules.display_name(rule.zone_id),
        })
        .collect();

    if json {
        output::print_highlighted_json(&serde_json::to_value(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("{}", "No routing rules.".dimmed());
        return Ok(());
    }

    let count = rows.len();
    let rows: Vec<RuleRow> = rows
        .into_iter()
        .map(|row| RuleRow {
            title_contains: output::truncate(&row.title_contains, MAX_LABEL_CHARS),
            zone_name: output::truncate(&row.zone_name, MAX_LABEL_CHARS),
            ..row
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();

    println!("{}", format!("Rules ({count})").bold());
    println!("{table}");
    Ok(())
}

/// The layout and rule store to edit.
fn editable(session: &ConfigSession) -> Result<(SplitLayout, RuleStore), ZoneRouterError> {
    let layout = session.layout(&ScreenArgs::default().display()?.frame);
    let rules = session.rules(&layout);
    Ok((layout, rules))
}

/// Like [`editable`], but fails unless the layout produces `zone_id`.
fn editable_zone(
    session: &ConfigSession,
    zone_id: u32,
) -> Result<(SplitLayout, RuleStore), ZoneRouterError> {
    let (layout, rules) = editable(session)?;
    let zone_count = u32::try_from(layout.zone_count()).unwrap_or(u32::MAX);
    if zone_id == 0 || zone_id > zone_count {
        return Err(ZoneRouterError::ZoneNotFound(zone_id));
    }
    Ok((layout, rules))
}

/// Execute `zonerouter assign`.
///
/// # Errors
///
/// Returns an error if the zone does not exist, the process name is blank,
/// or the configuration cannot be saved.
pub fn execute_assign(
    session: &mut ConfigSession,
    process: &str,
    zone_id: u32,
    title: Option<&str>,
) -> Result<(), ZoneRouterError> {
    let (layout, mut rules) = editable_zone(session, zone_id)?;

    let added = match title {
        Some(filter) => rules.add_title_rule(process, filter, zone_id),
        None => rules.assign_process_to_zone(process, zone_id),
    };
    if !added {
        return Err(ZoneRouterError::InvalidArguments(
            "Process name cannot be empty".to_string(),
        ));
    }

    let path = session.commit(layout, &rules)?;

    let target = format!("{} ({})", rules.display_name(zone_id), zone_id);
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(filter) => println!(
            "{} {} windows titled \"{filter}\" → {}",
            "Assigned".green(),
            process.trim().bold(),
            target.bold()
        ),
        None => println!("{} {} → {}", "Assigned".green(), process.trim().bold(), target.bold()),
    }
    println!("{}", format!("Saved to {}", path.display()).dimmed());
    Ok(())
}

/// Execute `zonerouter unassign`.
///
/// # Errors
///
/// Returns an error if no rule exists for the process or the configuration
/// cannot be saved.
pub fn execute_unassign(session: &mut ConfigSession, process: &str) -> Result<(), ZoneRouterError> {
    let (layout, mut rules) = editable(session)?;

    if !rules.remove_process(process) {
        return Err(ZoneRouterError::InvalidArguments(format!(
            "No rule found for process '{}'",
            process.trim()
        )));
    }

    let path = session.commit(layout, &rules)?;
    println!("{} {}", "Removed rules for".green(), process.trim().bold());
    println!("{}", format!("Saved to {}", path.display()).dimmed());
    Ok(())
}

/// Execute `zonerouter rename`.
///
/// # Errors
///
/// Returns an error if the zone does not exist, the name is blank, or the
/// configuration cannot be saved.
pub fn execute_rename(
    session: &mut ConfigSession,
    zone_id: u32,
    name: &str,
) -> Result<(), ZoneRouterError> {
    let (layout, mut rules) = editable_zone(session, zone_id)?;

    if !rules.rename_zone(zone_id, name) {
        return Err(ZoneRouterError::InvalidArguments("Zone name cannot be empty".to_string()));
    }

    let path = session.commit(layout, &rules)?;
    println!("{} zone {zone_id} → {}", "Renamed".green(), name.trim().bold());
    println!("{}", format!("Saved to {}", path.display()).dimmed());
    Ok(())
}
