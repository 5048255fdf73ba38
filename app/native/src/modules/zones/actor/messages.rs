//! Message types for the zone actor.
//!
//! All communication with the zone actor happens through messages:
//! - `ZoneMessage` - commands sent to the actor
//! - `ZoneQuery` - requests for state data (with response channel)
//! - `QueryResult` - responses from queries

use tokio::sync::oneshot;

use crate::modules::zones::layout::SplitLayout;
use crate::modules::zones::monitor::{MonitorState, PickerOutcome};
use crate::modules::zones::router::ZoneSummary;
use crate::modules::zones::rules::RoutingRule;
use crate::modules::zones::state::{Point, Rect, WindowHandle, ZoneViewMode};

// ============================================================================
// Zone Messages
// ============================================================================

/// Messages sent to the zone actor.
#[derive(Debug)]
pub enum ZoneMessage {
    // ════════════════════════════════════════════════════════════════════════
    // Monitor
    // ════════════════════════════════════════════════════════════════════════
    /// Start polling for window changes.
    StartMonitor,

    /// Stop polling. An open picker stays open.
    StopMonitor,

    /// Run one poll cycle now.
    Tick,

    /// The user answered the zone picker.
    PickerResolved(PickerOutcome),

    /// Route every visible window that has a rule.
    ApplySavedRules,

    // ════════════════════════════════════════════════════════════════════════
    // Mode & Overlay
    // ════════════════════════════════════════════════════════════════════════
    /// Switch the view mode.
    SetMode { mode: ZoneViewMode },

    /// Flip between zone and desktop mode.
    ToggleMode,

    /// Set the overlay dim level.
    SetOverlayOpacity { opacity: f64 },

    // ════════════════════════════════════════════════════════════════════════
    // Layout Edits
    // ════════════════════════════════════════════════════════════════════════
    /// Drag a split point.
    MoveSplitPoint { index: usize, point: Point },

    /// Add a split point.
    AddSplitPoint { point: Point },

    /// Remove a split point.
    RemoveSplitPoint { index: usize },

    /// Add an independent vertical line.
    AddVerticalLine { x: f64 },

    /// Add an independent horizontal line.
    AddHorizontalLine { y: f64 },

    /// Remove an independent vertical line.
    RemoveVerticalLine { index: usize },

    /// Remove an independent horizontal line.
    RemoveHorizontalLine { index: usize },

    /// Remove every split point and line.
    ClearLayout,

    // ════════════════════════════════════════════════════════════════════════
    // Rules & Zones
    // ════════════════════════════════════════════════════════════════════════
    /// Bind a process to a zone.
    AssignProcess { process_name: String, zone_id: u32 },

    /// Bind a process whose window title contains `title_contains` to a zone.
    AddTitleRule {
        process_name: String,
        title_contains: String,
        zone_id: u32,
    },

    /// Forget every rule for a process.
    RemoveProcess { process_name: String },

    /// Rename a zone.
    RenameZone { zone_id: u32, name: String },

    // ════════════════════════════════════════════════════════════════════════
    // Window Commands
    // ════════════════════════════════════════════════════════════════════════
    /// Send the foreground window to a zone and remember its process.
    SendForegroundToZone { zone_id: u32 },

    /// Bring a zone member to the front.
    FocusWindow { handle: WindowHandle },

    // ════════════════════════════════════════════════════════════════════════
    // Queries & Control
    // ════════════════════════════════════════════════════════════════════════
    /// Query state with a response channel.
    Query {
        query: ZoneQuery,
        respond_to: oneshot::Sender<QueryResult>,
    },

    /// Stop the actor.
    Shutdown,
}

impl ZoneMessage {
    /// Message name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StartMonitor => "StartMonitor",
            Self::StopMonitor => "StopMonitor",
            Self::Tick => "Tick",
            Self::PickerResolved(_) => "PickerResolved",
            Self::ApplySavedRules => "ApplySavedRules",
            Self::SetMode { .. } => "SetMode",
            Self::ToggleMode => "ToggleMode",
            Self::SetOverlayOpacity { .. } => "SetOverlayOpacity",
            Self::MoveSplitPoint { .. } => "MoveSplitPoint",
            Self::AddSplitPoint { .. } => "AddSplitPoint",
            Self::RemoveSplitPoint { .. } => "RemoveSplitPoint",
            Self::AddVerticalLine { .. } => "AddVerticalLine",
            Self::AddHorizontalLine { .. } => "AddHorizontalLine",
            Self::RemoveVerticalLine { .. } => "RemoveVerticalLine",
            Self::RemoveHorizontalLine { .. } => "RemoveHorizontalLine",
            Self::ClearLayout => "ClearLayout",
            Self::AssignProcess { .. } => "AssignProcess",
            Self::AddTitleRule { .. } => "AddTitleRule",
            Self::RemoveProcess { .. } => "RemoveProcess",
            Self::RenameZone { .. } => "RenameZone",
            Self::SendForegroundToZone { .. } => "SendForegroundToZone",
            Self::FocusWindow { .. } => "FocusWindow",
            Self::Query { .. } => "Query",
            Self::Shutdown => "Shutdown",
        }
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Queries that can be executed against the actor's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneQuery {
    /// Current zones in device pixels.
    Zones,
    /// Zone bar data for every zone.
    ZoneSummaries,
    /// Current split layout.
    Layout,
    Mode,
    OverlayOpacity,
    /// Windows waiting for the picker.
    PendingPickers,
    MonitorState,
    Rules,
}

/// Results from queries.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Zones(Vec<(u32, Rect)>),
    Summaries(Vec<ZoneSummary>),
    Layout(SplitLayout),
    Mode(ZoneViewMode),
    Opacity(f64),
    Count(usize),
    Monitor(MonitorState),
    Rules(Vec<RoutingRule>),
}

impl QueryResult {
    /// Try to get zones from the result.
    #[must_use]
    pub fn into_zones(self) -> Option<Vec<(u32, Rect)>> {
        match self {
            Self::Zones(zones) => Some(zones),
            _ => None,
        }
    }

    /// Try to get zone summaries from the result.
    #[must_use]
    pub fn into_summaries(self) -> Option<Vec<ZoneSummary>> {
        match self {
            Self::Summaries(summaries) => Some(summaries),
            _ => None,
        }
    }

    /// Try to get the split layout from the result.
    #[must_use]
    pub fn into_layout(self) -> Option<SplitLayout> {
        match self {
            Self::Layout(layout) => Some(layout),
            _ => None,
        }
    }

    /// Try to get the view mode from the result.
    #[must_use]
    pub fn into_mode(self) -> Option<ZoneViewMode> {
        match self {
            Self::Mode(mode) => Some(mode),
            _ => None,
        }
    }

    /// Try to get the overlay opacity from the result.
    #[must_use]
    pub fn into_opacity(self) -> Option<f64> {
        match self {
            Self::Opacity(opacity) => Some(opacity),
            _ => None,
        }
    }

    /// Try to get a count from the result.
    #[must_use]
    pub fn into_count(self) -> Option<usize> {
        match self {
            Self::Count(count) => Some(count),
            _ => None,
        }
    }

    /// Try to get the monitor state from the result.
    #[must_use]
    pub fn into_monitor(self) -> Option<MonitorState> {
        match self {
            Self::Monitor(state) => Some(state),
            _ => None,
        }
    }

    /// Try to get routing rules from the result.
    #[must_use]
    pub fn into_rules(self) -> Option<Vec<RoutingRule>> {
        match self {
            Self::Rules(rules) => Some(rules),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
