//! Zone registry and window router.
//!
//! The router owns two maps and is the only component that mutates them:
//!
//! - `current_zones`: zone id → rectangle in device pixels
//! - `zone_windows`: zone id → ordered set of window handles
//!
//! A handle is a member of at most one zone at a time. Membership does not
//! follow geometry: when the layout changes, windows stay where they are until
//! they are explicitly reassigned.
//!
//! There is no close notification. Closed windows are reclaimed by
//! [`Router::sync_zone_windows`], which re-validates every stored handle
//! against a fresh enumeration.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::modules::zones::layout::ZoneMap;
use crate::modules::zones::rules::RuleStore;
use crate::modules::zones::state::{DpiScale, Rect, WindowHandle, WindowIdList, WindowInfo};
use crate::modules::zones::surface::{SurfaceError, WindowSurface};

/// A zone member as shown on a zone bar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneMember {
    pub handle: WindowHandle,
    pub title: String,
}

/// Everything a zone bar needs to render one zone.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSummary {
    pub zone_id: u32,
    pub display_name: String,
    pub rect: Rect,
    pub windows: Vec<ZoneMember>,
}

/// Zone registry and router.
pub struct Router {
    surface: Arc<dyn WindowSurface>,
    rules: RuleStore,
    scale: DpiScale,
    current_zones: ZoneMap,
    zone_windows: BTreeMap<u32, WindowIdList>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("scale", &self.scale)
            .field("current_zones", &self.current_zones)
            .field("zone_windows", &self.zone_windows)
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Create a router with no zones.
    ///
    /// `scale` converts logical zone rectangles to device pixels.
    #[must_use]
    pub fn new(surface: Arc<dyn WindowSurface>, rules: RuleStore, scale: DpiScale) -> Self {
        Self {
            surface,
            rules,
            scale,
            current_zones: ZoneMap::new(),
            zone_windows: BTreeMap::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The rule store.
    #[must_use]
    pub const fn rules(&self) -> &RuleStore { &self.rules }

    /// Mutable access to the rule store for its own update operations.
    pub const fn rules_mut(&mut self) -> &mut RuleStore { &mut self.rules }

    /// Current zones in device pixels.
    #[must_use]
    pub const fn current_zones(&self) -> &ZoneMap { &self.current_zones }

    /// Pixel rectangle of a zone.
    #[must_use]
    pub fn zone_rect(&self, zone_id: u32) -> Option<Rect> { self.current_zones.get(&zone_id).copied() }

    /// Members of a zone, in assignment order.
    #[must_use]
    pub fn windows_in_zone(&self, zone_id: u32) -> &[WindowHandle] {
        self.zone_windows.get(&zone_id).map(|list| list.as_slice()).unwrap_or_default()
    }

    /// Zone a window is currently assigned to.
    #[must_use]
    pub fn zone_of(&self, handle: WindowHandle) -> Option<u32> {
        self.zone_windows
            .iter()
            .find(|(_, list)| list.contains(&handle))
            .map(|(zone_id, _)| *zone_id)
    }

    /// Total number of assigned windows.
    #[must_use]
    pub fn assigned_count(&self) -> usize { self.zone_windows.values().map(|list| list.len()).sum() }

    // ========================================================================
    // Zone Registry
    // ========================================================================

    /// Replaces the current zones with `zones` (logical units).
    ///
    /// Rectangles are converted to device pixels. New zone ids get an empty
    /// membership set; existing memberships are left untouched.
    pub fn update_zones(&mut self, zones: &ZoneMap) {
        self.current_zones =
            zones.iter().map(|(zone_id, rect)| (*zone_id, rect.to_pixels(self.scale))).collect();

        for zone_id in self.current_zones.keys() {
            self.zone_windows.entry(*zone_id).or_default();
        }

        tracing::debug!(zones = self.current_zones.len(), "zones: router zones updated");
    }

    // ========================================================================
    // Routing
    // ========================================================================

    /// Routes a window by rule.
    ///
    /// Returns `true` if a rule matched, whether or not the window could be
    /// placed. `false` means the window needs an interactive decision; zone
    /// memberships are unchanged in that case.
    pub fn try_auto_route(&mut self, window: &WindowInfo) -> bool {
        let Some(zone_id) =
            self.rules.find_zone_for_process(&window.process_name, Some(&window.title))
        else {
            return false;
        };

        tracing::debug!(
            handle = %window.handle,
            process = %window.process_name,
            zone_id,
            "zones: rule matched"
        );
        self.assign_window_to_zone(window.handle, zone_id);
        true
    }

    /// Moves a window into a zone and records the membership.
    ///
    /// Unknown zone ids are ignored. A failed move is logged and leaves the
    /// memberships unchanged. Assigning a window to the zone it is already in
    /// moves it again but does not change membership.
    ///
    /// Returns `true` if the window is now a member of `zone_id`.
    pub fn assign_window_to_zone(&mut self, handle: WindowHandle, zone_id: u32) -> bool {
        let Some(rect) = self.current_zones.get(&zone_id).copied() else {
            tracing::debug!(handle = %handle, zone_id, "zones: unknown zone, window left in place");
            return false;
        };

        if let Err(err) = self.surface.move_and_resize(handle, &rect) {
            tracing::warn!(handle = %handle, zone_id, error = %err, "zones: failed to move window");
            return false;
        }

        for list in self.zone_windows.values_mut() {
            list.retain(|member| *member != handle);
        }

        let members = self.zone_windows.entry(zone_id).or_default();
        if !members.contains(&handle) {
            members.push(handle);
        }

        tracing::debug!(handle = %handle, zone_id, rect = %rect, "zones: window assigned");
        true
    }

    /// Binds the window's process to `zone_id` and assigns the window.
    ///
    /// Returns `true` if the rule was recorded.
    pub fn bind_and_assign(&mut self, window: &WindowInfo, zone_id: u32) -> bool {
        let bound = self.rules.assign_process_to_zone(&window.process_name, zone_id);
        self.assign_window_to_zone(window.handle, zone_id);
        bound
    }

    /// Routes every visible window that has a rule.
    ///
    /// Does nothing while no zones are defined. Returns the number of windows
    /// whose rule matched.
    pub fn apply_saved_rules(&mut self) -> usize {
        if self.current_zones.is_empty() {
            return 0;
        }

        let windows = match self.surface.visible_windows() {
            Ok(windows) => windows,
            Err(err) => {
                tracing::warn!(error = %err, "zones: cannot apply saved rules");
                return 0;
            }
        };

        self.apply_rules_to(&windows)
    }

    /// Routes every window in `windows` that has a rule. Windows without one
    /// are left alone. Returns the number of rule matches.
    pub fn apply_rules_to(&mut self, windows: &[WindowInfo]) -> usize {
        if self.current_zones.is_empty() {
            return 0;
        }
        let routed = windows.iter().filter(|window| self.try_auto_route(window)).count();
        tracing::info!(routed, total = windows.len(), "zones: saved rules applied");
        routed
    }

    /// Drops closed windows from every zone.
    ///
    /// If enumeration fails the memberships are kept as they are. Returns the
    /// number of handles removed.
    pub fn sync_zone_windows(&mut self) -> usize {
        match self.surface.visible_windows() {
            Ok(windows) => self.retain_windows(&windows),
            Err(err) => {
                tracing::warn!(error = %err, "zones: cannot sync zone windows");
                0
            }
        }
    }

    /// Drops every member that is not in `windows`, a fresh enumeration.
    pub fn retain_windows(&mut self, windows: &[WindowInfo]) -> usize {
        let visible: HashSet<WindowHandle> = windows.iter().map(|w| w.handle).collect();
        let mut removed = 0;
        for (zone_id, list) in &mut self.zone_windows {
            let before = list.len();
            list.retain(|handle| visible.contains(handle));
            let dropped = before - list.len();
            if dropped > 0 {
                tracing::trace!(zone_id, dropped, "zones: closed windows removed");
            }
            removed += dropped;
        }
        removed
    }

    /// Enumerates visible top-level windows.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's error if enumeration fails.
    pub fn visible_windows(&self) -> Result<Vec<WindowInfo>, SurfaceError> {
        self.surface.visible_windows()
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Sends the foreground window to `zone_id` and remembers its process.
    ///
    /// Returns the window that was sent, or `None` if there is no foreground
    /// window, it is not a routable window, or the zone is unknown.
    pub fn send_foreground_to_zone(&mut self, zone_id: u32) -> Option<WindowInfo> {
        if !self.current_zones.contains_key(&zone_id) {
            return None;
        }
        let foreground = self.surface.foreground_window()?;

        let windows = match self.surface.visible_windows() {
            Ok(windows) => windows,
            Err(err) => {
                tracing::warn!(error = %err, "zones: cannot resolve foreground window");
                return None;
            }
        };
        let window = windows.into_iter().find(|w| w.handle == foreground)?;

        self.bind_and_assign(&window, zone_id);
        Some(window)
    }

    /// Brings a zone member to the front.
    ///
    /// Handles that are not a member of any zone are ignored.
    pub fn focus_window(&self, handle: WindowHandle) -> bool {
        if self.zone_of(handle).is_none() {
            return false;
        }
        match self.surface.bring_to_front(handle) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(handle = %handle, error = %err, "zones: failed to focus window");
                false
            }
        }
    }

    /// Builds zone bar summaries from a window snapshot.
    ///
    /// Members missing from `windows` are skipped.
    #[must_use]
    pub fn zone_summaries(&self, windows: &[WindowInfo]) -> Vec<ZoneSummary> {
        self.current_zones
            .iter()
            .map(|(zone_id, rect)| ZoneSummary {
                zone_id: *zone_id,
                display_name: self.rules.display_name(*zone_id),
                rect: *rect,
                windows: self
                    .windows_in_zone(*zone_id)
                    .iter()
                    .filter_map(|handle| windows.iter().find(|w| w.handle == *handle))
                    .map(|w| ZoneMember {
                        handle: w.handle,
                        title: w.title.clone(),
                    })
                    .collect(),
            })
            .collect()
    }
}
