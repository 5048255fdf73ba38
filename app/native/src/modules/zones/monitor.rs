//! Window change monitor.
//!
//! Polls the visible window set on a fixed interval, routes windows that have
//! a rule and queues the rest for an interactive zone picker.
//!
//! # States
//!
//! ```text
//!            start()                 undecided window
//!   Idle ──────────────▶ Polling ─────────────────────▶ PickerActive
//!    ▲                     ▲  ▲                              │
//!    │       stop()        │  └──── resolve(), queue empty ──┤
//!    └─────────────────────┘                                 │
//!                          resolve(), queue non-empty ───────┘ (next picker)
//! ```
//!
//! Exactly one picker is outstanding at a time. Ticks keep running while a
//! picker is open: new windows are still routed or queued and closed windows
//! are still dropped from their zones.
//!
//! # Picker Protocol
//!
//! Each presented window gets a fresh [`PickerTicket`]. The request leaves
//! through an unbounded channel; the outcome comes back through
//! [`WindowMonitor::resolve`]. Outcomes carrying any other ticket are stale and
//! ignored.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};

use crate::modules::zones::router::Router;
use crate::modules::zones::state::{AppState, WindowHandle, WindowInfo, ZoneViewMode};

// ============================================================================
// Picker Types
// ============================================================================

/// Identifies one presentation of the picker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PickerTicket(pub u64);

/// A zone offered by the picker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneChoice {
    pub zone_id: u32,
    pub display_name: String,
}

/// Asks the user to pick a zone for an undecided window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerRequest {
    pub ticket: PickerTicket,
    pub window: WindowInfo,
    pub choices: Vec<ZoneChoice>,
}

/// The user's answer. `zone_id` is `None` when the picker was closed without
/// a selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PickerOutcome {
    pub ticket: PickerTicket,
    pub zone_id: Option<u32>,
}

impl PickerOutcome {
    /// A selection of `zone_id`.
    #[must_use]
    pub const fn chosen(ticket: PickerTicket, zone_id: u32) -> Self {
        Self { ticket, zone_id: Some(zone_id) }
    }

    /// The picker was closed without a selection.
    #[must_use]
    pub const fn dismissed(ticket: PickerTicket) -> Self { Self { ticket, zone_id: None } }
}

/// What [`WindowMonitor::resolve`] did with an outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The ticket does not match the open picker.
    Stale,
    /// Closed without a selection.
    Dismissed,
    /// The window's process was bound to the zone and the window assigned.
    Assigned { zone_id: u32, process_name: String },
}

impl Resolution {
    /// Whether the rule store changed.
    #[must_use]
    pub const fn changed_rules(&self) -> bool { matches!(self, Self::Assigned { .. }) }
}

// ============================================================================
// Monitor State
// ============================================================================

/// Monitor state machine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum MonitorState {
    #[default]
    Idle,
    Polling,
    PickerActive { ticket: PickerTicket, window: WindowInfo },
}

impl MonitorState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Polling => "polling",
            Self::PickerActive { .. } => "picker-active",
        }
    }
}

/// Counters for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Windows not seen on the previous tick.
    pub appeared: usize,
    /// Windows placed by rule, including the deferred start snapshot.
    pub routed: usize,
    /// New windows queued for the picker.
    pub queued: usize,
    /// New windows let through untouched while in desktop mode.
    pub passed: usize,
    /// Closed windows dropped from their zones.
    pub dropped: usize,
}

// ============================================================================
// Window Monitor
// ============================================================================

/// Polls for window changes and serializes picker interaction.
#[derive(Debug)]
pub struct WindowMonitor {
    router: Router,
    state: MonitorState,
    running: bool,
    /// `false` until a successful enumeration has seeded `known`.
    has_baseline: bool,
    known: HashSet<WindowHandle>,
    pending: VecDeque<WindowInfo>,
    picker_tx: mpsc::UnboundedSender<PickerRequest>,
    mode: watch::Receiver<ZoneViewMode>,
    next_ticket: u64,
    interval: Duration,
}

impl WindowMonitor {
    /// Create a stopped monitor.
    #[must_use]
    pub fn new(
        router: Router,
        app_state: &AppState,
        picker_tx: mpsc::UnboundedSender<PickerRequest>,
        interval: Duration,
    ) -> Self {
        Self {
            router,
            state: MonitorState::Idle,
            running: false,
            has_baseline: false,
            known: HashSet::new(),
            pending: VecDeque::new(),
            picker_tx,
            mode: app_state.subscribe(),
            next_ticket: 1,
            interval,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub const fn router(&self) -> &Router { &self.router }

    pub const fn router_mut(&mut self) -> &mut Router { &mut self.router }

    #[must_use]
    pub const fn state(&self) -> &MonitorState { &self.state }

    #[must_use]
    pub const fn is_running(&self) -> bool { self.running }

    /// Number of windows waiting for the picker.
    #[must_use]
    pub fn pending_len(&self) -> usize { self.pending.len() }

    /// Number of windows seen on the last successful enumeration.
    #[must_use]
    pub fn known_len(&self) -> usize { self.known.len() }

    /// Tick interval.
    #[must_use]
    pub const fn interval(&self) -> Duration { self.interval }

    fn routes_windows(&self) -> bool { self.mode.borrow().routes_windows() }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Starts polling.
    ///
    /// Windows already on screen become the known set and are placed by the
    /// saved rules; they are never queued for the picker.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;

        match self.router.visible_windows() {
            Ok(windows) => {
                self.known = windows.iter().map(|w| w.handle).collect();
                self.has_baseline = true;
                self.router.apply_rules_to(&windows);
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "zones: monitor cannot snapshot windows at start, deferring to first tick"
                );
            }
        }

        if self.state == MonitorState::Idle {
            self.state = MonitorState::Polling;
        }
        tracing::info!(
            known = self.known.len(),
            interval_ms = self.interval.as_millis(),
            "zones: monitor started"
        );
    }

    /// Stops polling. An open picker stays open until it is resolved.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        if self.state == MonitorState::Polling {
            self.state = MonitorState::Idle;
        }
        tracing::info!(pending = self.pending.len(), "zones: monitor stopped");
    }

    // ========================================================================
    // Polling
    // ========================================================================

    /// Runs one poll cycle. Does nothing while stopped.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if !self.running {
            return report;
        }

        let windows = match self.router.visible_windows() {
            Ok(windows) => windows,
            Err(err) => {
                tracing::warn!(error = %err, "zones: monitor tick skipped");
                return report;
            }
        };

        if self.has_baseline {
            let routes = self.routes_windows();
            for window in windows.iter().filter(|w| !self.known.contains(&w.handle)) {
                report.appeared += 1;
                if !routes {
                    report.passed += 1;
                } else if self.router.try_auto_route(window) {
                    report.routed += 1;
                } else {
                    tracing::debug!(
                        handle = %window.handle,
                        process = %window.process_name,
                        "zones: monitor queued undecided window"
                    );
                    self.pending.push_back(window.clone());
                    report.queued += 1;
                }
            }
        } else {
            // Deferred start snapshot: saved rules only, nothing is queued.
            report.routed = self.router.apply_rules_to(&windows);
        }

        report.dropped = self.router.retain_windows(&windows);
        self.known = windows.iter().map(|w| w.handle).collect();
        self.has_baseline = true;

        if self.state == MonitorState::Polling {
            self.present_next();
        }

        if report.appeared > 0 || report.dropped > 0 {
            tracing::trace!(?report, "zones: monitor tick");
        }
        report
    }

    // ========================================================================
    // Picker
    // ========================================================================

    /// Applies the user's answer to the open picker.
    ///
    /// A chosen zone binds the window's process to it and assigns the window.
    /// Either way the next queued window is presented.
    pub fn resolve(&mut self, outcome: PickerOutcome) -> Resolution {
        let window = match &self.state {
            MonitorState::PickerActive { ticket, window } if *ticket == outcome.ticket => {
                window.clone()
            }
            _ => {
                tracing::debug!(ticket = outcome.ticket.0, "zones: stale picker outcome ignored");
                return Resolution::Stale;
            }
        };

        let resolution = match outcome.zone_id {
            Some(zone_id) => {
                self.router.bind_and_assign(&window, zone_id);
                tracing::info!(
                    handle = %window.handle,
                    process = %window.process_name,
                    zone_id,
                    "zones: picker assigned window"
                );
                Resolution::Assigned {
                    zone_id,
                    process_name: window.process_name,
                }
            }
            None => {
                tracing::debug!(handle = %window.handle, "zones: picker dismissed");
                Resolution::Dismissed
            }
        };

        if self.running {
            self.state = MonitorState::Polling;
            self.present_next();
        } else {
            self.state = MonitorState::Idle;
        }
        resolution
    }

    /// Presents the next queued window that is still on screen.
    fn present_next(&mut self) {
        if !self.routes_windows() {
            return;
        }

        while let Some(window) = self.pending.front().cloned() {
            if !self.known.contains(&window.handle) {
                tracing::debug!(handle = %window.handle, "zones: queued window closed before picking");
                self.pending.pop_front();
                continue;
            }

            let ticket = PickerTicket(self.next_ticket);
            self.next_ticket += 1;

            let request = PickerRequest {
                ticket,
                window: window.clone(),
                choices: self.zone_choices(),
            };
            if self.picker_tx.send(request).is_err() {
                tracing::warn!(handle = %window.handle, "zones: no picker listening, window left undecided");
                return;
            }
            self.pending.pop_front();

            tracing::debug!(ticket = ticket.0, handle = %window.handle, "zones: picker presented");
            self.state = MonitorState::PickerActive { ticket, window };
            return;
        }
    }

    fn zone_choices(&self) -> Vec<ZoneChoice> {
        self.router
            .current_zones()
            .keys()
            .map(|zone_id| ZoneChoice {
                zone_id: *zone_id,
                display_name: self.router.rules().display_name(*zone_id),
            })
            .collect()
    }
}
