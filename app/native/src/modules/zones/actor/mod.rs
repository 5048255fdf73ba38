//! Zone actor module.
//!
//! The zone actor owns the window monitor (and through it the router and
//! rule store), the split layout and the application state. It runs on a
//! single task that multiplexes the poll timer and incoming messages, so all
//! zone state is mutated from one place without locking.
//!
//! # Persistence
//!
//! Every layout edit recomputes the zones, makes sure each zone has a
//! definition, pushes the zones into the router and writes the configuration
//! back. Rule changes, renames and opacity changes are written back too.
//! Write failures are logged and never stop the actor.
//!
//! # Panic Recovery
//!
//! If a message handler panics the panic is caught and logged and the actor
//! keeps processing subsequent messages.

mod handle;
mod messages;

use std::ops::ControlFlow;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::Arc;

pub use handle::{ActorError, ZoneActorHandle};
pub use messages::{QueryResult, ZoneMessage, ZoneQuery};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::config::{ZoneConfig, save_config};
use crate::modules::zones::layout::SplitLayout;
use crate::modules::zones::monitor::{PickerRequest, WindowMonitor};
use crate::modules::zones::router::Router;
use crate::modules::zones::rules::RuleStore;
use crate::modules::zones::state::{AppState, Display, ZoneViewMode};
use crate::modules::zones::surface::WindowSurface;

/// Channel buffer size for the zone actor.
const CHANNEL_BUFFER_SIZE: usize = 256;

/// The actor that owns all zone state.
pub struct ZoneActor {
    monitor: WindowMonitor,
    layout: SplitLayout,
    app_state: AppState,
    display: Display,
    /// Where the configuration is written back to. `None` disables saving.
    config_path: Option<PathBuf>,
    receiver: mpsc::Receiver<ZoneMessage>,
}

impl ZoneActor {
    /// Builds the actor from a loaded configuration without starting it.
    ///
    /// A fresh configuration is seeded with a split point in the middle of
    /// the screen.
    fn new(
        config: ZoneConfig,
        config_path: Option<PathBuf>,
        display: Display,
        surface: Arc<dyn WindowSurface>,
        receiver: mpsc::Receiver<ZoneMessage>,
        picker_tx: mpsc::UnboundedSender<PickerRequest>,
    ) -> Self {
        let mut config = config;
        config.normalize();

        let layout = config.effective_layout(&display.frame);

        let app_state = AppState::new(ZoneViewMode::default(), config.overlay_opacity);
        let rules = RuleStore::from_config(&config.zones, &config.rules);
        let router = Router::new(surface, rules, display.scale);
        let monitor = WindowMonitor::new(router, &app_state, picker_tx, config.poll_interval());

        let mut actor = Self {
            monitor,
            layout,
            app_state,
            display,
            config_path,
            receiver,
        };
        actor.refresh_zones();
        actor
    }

    /// Spawn the actor on the current tokio runtime.
    ///
    /// Returns the handle and the receiver for zone picker requests. Picker
    /// answers go back through [`ZoneActorHandle::resolve_picker`]. The
    /// monitor starts polling immediately.
    #[must_use]
    pub fn spawn(
        config: ZoneConfig,
        config_path: Option<PathBuf>,
        display: Display,
        surface: Arc<dyn WindowSurface>,
    ) -> (ZoneActorHandle, mpsc::UnboundedReceiver<PickerRequest>) {
        tracing::debug!("zones: spawning zone actor");
        let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let (picker_tx, picker_rx) = mpsc::unbounded_channel();

        let actor = Self::new(config, config_path, display, surface, receiver, picker_tx);
        tokio::spawn(actor.run());

        (ZoneActorHandle::new(sender), picker_rx)
    }

    /// Run the actor's loop until shutdown or until every handle is dropped.
    async fn run(mut self) {
        tracing::trace!("zones: actor loop starting");
        self.monitor.start();

        let mut ticker = tokio::time::interval(self.monitor.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                msg = self.receiver.recv() => {
                    let Some(msg) = msg else {
                        tracing::debug!("zones: actor channel closed, exiting");
                        break;
                    };
                    if self.dispatch(msg).is_break() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.guarded("Tick", |actor| {
                        actor.monitor.tick();
                    });
                }
            }
        }

        self.monitor.stop();
    }

    /// Handles one message. A panicking handler does not stop the loop.
    fn dispatch(&mut self, msg: ZoneMessage) -> ControlFlow<()> {
        let name = msg.name();
        self.guarded(name, |actor| actor.handle_message(msg)).unwrap_or(ControlFlow::Continue(()))
    }

    /// Runs `f`, logging instead of propagating a panic.
    fn guarded<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        match catch_unwind(AssertUnwindSafe(|| f(self))) {
            Ok(value) => Some(value),
            Err(panic_info) => {
                let panic_msg = panic_info
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic_info.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());

                tracing::error!(msg = name, panic = %panic_msg, "zones: PANIC in actor");
                tracing::error!("zones: actor recovered from panic, state may be inconsistent");
                None
            }
        }
    }

    /// Handle a single message. Returns `Break` on shutdown.
    fn handle_message(&mut self, msg: ZoneMessage) -> ControlFlow<()> {
        match msg {
            ZoneMessage::StartMonitor => self.monitor.start(),
            ZoneMessage::StopMonitor => self.monitor.stop(),
            ZoneMessage::Tick => {
                self.monitor.tick();
            }
            ZoneMessage::PickerResolved(outcome) => {
                if self.monitor.resolve(outcome).changed_rules() {
                    self.persist();
                }
            }
            ZoneMessage::ApplySavedRules => {
                self.monitor.router_mut().apply_saved_rules();
            }

            ZoneMessage::SetMode { mode } => {
                self.app_state.set_mode(mode);
            }
            ZoneMessage::ToggleMode => {
                self.app_state.toggle();
            }
            ZoneMessage::SetOverlayOpacity { opacity } => {
                self.app_state.set_overlay_opacity(opacity);
                self.persist();
            }

            ZoneMessage::MoveSplitPoint { index, point } => {
                self.edit_layout(|layout| layout.move_point(index, point));
            }
            ZoneMessage::AddSplitPoint { point } => {
                self.edit_layout(|layout| {
                    layout.add_point(point);
                    true
                });
            }
            ZoneMessage::RemoveSplitPoint { index } => {
                self.edit_layout(|layout| layout.remove_point(index));
            }
            ZoneMessage::AddVerticalLine { x } => {
                self.edit_layout(|layout| {
                    layout.add_vertical_line(x);
                    true
                });
            }
            ZoneMessage::AddHorizontalLine { y } => {
                self.edit_layout(|layout| {
                    layout.add_horizontal_line(y);
                    true
                });
            }
            ZoneMessage::RemoveVerticalLine { index } => {
                self.edit_layout(|layout| layout.remove_vertical_line(index));
            }
            ZoneMessage::RemoveHorizontalLine { index } => {
                self.edit_layout(|layout| layout.remove_horizontal_line(index));
            }
            ZoneMessage::ClearLayout => {
                self.edit_layout(|layout| {
                    layout.clear();
                    true
                });
            }

            ZoneMessage::AssignProcess { process_name, zone_id } => {
                self.edit_rules(|rules| rules.assign_process_to_zone(&process_name, zone_id));
            }
            ZoneMessage::AddTitleRule {
                process_name,
                title_contains,
                zone_id,
            } => {
                self.edit_rules(|rules| rules.add_title_rule(&process_name, &title_contains, zone_id));
            }
            ZoneMessage::RemoveProcess { process_name } => {
                self.edit_rules(|rules| rules.remove_process(&process_name));
            }
            ZoneMessage::RenameZone { zone_id, name } => {
                self.edit_rules(|rules| rules.rename_zone(zone_id, &name));
            }

            ZoneMessage::SendForegroundToZone { zone_id } => {
                if self.monitor.router_mut().send_foreground_to_zone(zone_id).is_some() {
                    self.persist();
                }
            }
            ZoneMessage::FocusWindow { handle } => {
                self.monitor.router().focus_window(handle);
            }

            ZoneMessage::Query { query, respond_to } => {
                let result = self.execute_query(query);
                if respond_to.send(result).is_err() {
                    tracing::warn!("zones: failed to send query response (channel closed)");
                }
            }

            ZoneMessage::Shutdown => {
                tracing::debug!("zones: actor received shutdown message");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    // ========================================================================
    // State changes
    // ========================================================================

    /// Applies a layout edit. Unchanged layouts are neither recomputed nor saved.
    fn edit_layout(&mut self, edit: impl FnOnce(&mut SplitLayout) -> bool) {
        if edit(&mut self.layout) {
            tracing::trace!(zones = self.layout.zone_count(), "zones: layout edited");
            self.refresh_zones();
            self.persist();
        } else {
            tracing::debug!("zones: layout edit ignored");
        }
    }

    /// Applies a rule store edit and saves it if anything changed.
    fn edit_rules(&mut self, edit: impl FnOnce(&mut RuleStore) -> bool) {
        if edit(self.monitor.router_mut().rules_mut()) {
            self.persist();
        } else {
            tracing::debug!("zones: rule edit ignored");
        }
    }

    /// Recomputes the zones from the layout and pushes them into the router.
    fn refresh_zones(&mut self) {
        let zones = self.layout.zones(&self.display.frame);
        let router = self.monitor.router_mut();
        let added = router.rules_mut().ensure_zones(zones.len());
        if added > 0 {
            tracing::debug!(added, "zones: default zone definitions added");
        }
        router.update_zones(&zones);
    }

    /// Snapshot of the state that is persisted.
    fn to_config(&self) -> ZoneConfig {
        let (zones, rules) = self.monitor.router().rules().to_config();
        ZoneConfig {
            layout: self.layout.clone(),
            overlay_opacity: self.app_state.overlay_opacity(),
            zones,
            rules,
            poll_interval_ms: u64::try_from(self.monitor.interval().as_millis())
                .unwrap_or(u64::MAX),
            ..ZoneConfig::default()
        }
    }

    fn persist(&self) {
        let Some(path) = &self.config_path else {
            return;
        };
        match save_config(&self.to_config(), path) {
            Ok(()) => tracing::debug!(path = %path.display(), "zones: configuration saved"),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "zones: failed to save configuration");
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    fn execute_query(&self, query: ZoneQuery) -> QueryResult {
        let router = self.monitor.router();
        match query {
            ZoneQuery::Zones => QueryResult::Zones(
                router.current_zones().iter().map(|(zone_id, rect)| (*zone_id, *rect)).collect(),
            ),
            ZoneQuery::ZoneSummaries => {
                let windows = router.visible_windows().unwrap_or_else(|err| {
                    tracing::warn!(error = %err, "zones: cannot list windows for zone bars");
                    Vec::new()
                });
                QueryResult::Summaries(router.zone_summaries(&windows))
            }
            ZoneQuery::Layout => QueryResult::Layout(self.layout.clone()),
            ZoneQuery::Mode => QueryResult::Mode(self.app_state.mode()),
            ZoneQuery::OverlayOpacity => QueryResult::Opacity(self.app_state.overlay_opacity()),
            ZoneQuery::PendingPickers => QueryResult::Count(self.monitor.pending_len()),
            ZoneQuery::MonitorState => QueryResult::Monitor(self.monitor.state().clone()),
            ZoneQuery::Rules => QueryResult::Rules(router.rules().rules().to_vec()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::config::{ZoneDefinition, load_config_from_path};
    use crate::modules::zones::monitor::{MonitorState, PickerOutcome};
    use crate::modules::zones::state::{DpiScale, Point, Rect, WindowHandle, WindowInfo};
    use crate::modules::zones::surface::MemorySurface;

    fn display() -> Display { Display::new(Rect::new(0.0, 0.0, 1920.0, 1080.0), DpiScale::IDENTITY) }

    fn window(handle: u64, process: &str) -> WindowInfo {
        WindowInfo::new(WindowHandle(handle), format!("{process} window"), process, 1)
    }

    /// Long poll interval so the timer never fires on its own during a test.
    fn quiet_config() -> ZoneConfig {
        ZoneConfig {
            poll_interval_ms: 3_600_000,
            ..ZoneConfig::default()
        }
    }

    fn spawn_with(
        config: ZoneConfig,
        path: Option<PathBuf>,
    ) -> (Arc<MemorySurface>, ZoneActorHandle, mpsc::UnboundedReceiver<PickerRequest>) {
        let surface = Arc::new(MemorySurface::new());
        let (handle, pickers) = ZoneActor::spawn(config, path, display(), surface.clone());
        (surface, handle, pickers)
    }

    #[tokio::test]
    async fn test_empty_config_is_seeded_with_four_zones() {
        let (_, handle, _) = spawn_with(quiet_config(), None);

        let zones = handle.zones().await.unwrap();
        assert_eq!(zones.len(), 4);
        assert_eq!(zones[0], (1, Rect::new(0.0, 0.0, 960.0, 540.0)));

        let summaries = handle.zone_summaries().await.unwrap();
        assert_eq!(summaries[3].display_name, "Zone 4");
        assert_eq!(handle.monitor_state().await.unwrap(), MonitorState::Polling);
    }

    #[tokio::test]
    async fn test_tick_routes_and_presents_picker() {
        let mut config = quiet_config();
        config.layout = SplitLayout::seeded(&display().frame);
        config.zones.push(ZoneDefinition {
            zone_id: 2,
            display_name: "Notes".to_string(),
            process_names: vec!["notepad".to_string()],
        });
        let (surface, handle, mut pickers) = spawn_with(config, None);
        handle.monitor_state().await.unwrap();

        surface.open(window(1, "notepad"));
        surface.open(window(2, "calc"));
        handle.tick().unwrap();
        handle.pending_pickers().await.unwrap();

        assert_eq!(surface.frame_of(WindowHandle(1)), Some(Rect::new(960.0, 0.0, 960.0, 540.0)));
        let request = pickers.recv().await.unwrap();
        assert_eq!(request.window.handle, WindowHandle(2));

        handle.resolve_picker(PickerOutcome::chosen(request.ticket, 3)).unwrap();
        let rules = handle.rules().await.unwrap();
        assert!(rules.iter().any(|rule| rule.process_name == "calc" && rule.zone_id == 3));
        assert_eq!(surface.frame_of(WindowHandle(2)), Some(Rect::new(0.0, 540.0, 960.0, 540.0)));
    }

    #[tokio::test]
    async fn test_layout_edit_recomputes_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let (_, handle, _) = spawn_with(quiet_config(), Some(path.clone()));

        handle.send(ZoneMessage::AddVerticalLine { x: 1500.0 }).unwrap();
        let zones = handle.zones().await.unwrap();
        assert_eq!(zones.len(), 6);

        let saved = load_config_from_path(&path).unwrap();
        assert_eq!(saved.layout.extra_v_lines, vec![1500.0]);
        assert_eq!(saved.zones.len(), 6);
        assert_eq!(saved.zones[5].display_name, "Zone 6");
    }

    #[tokio::test]
    async fn test_ignored_layout_edit_does_not_persist() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let (_, handle, _) = spawn_with(quiet_config(), Some(path.clone()));

        handle.send(ZoneMessage::RemoveVerticalLine { index: 3 }).unwrap();
        handle.zones().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_title_rule_for_undefined_zone_is_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let (_, handle, _) = spawn_with(quiet_config(), Some(path.clone()));

        handle
            .send(ZoneMessage::AddTitleRule {
                process_name: "chrome".to_string(),
                title_contains: "YouTube".to_string(),
                zone_id: 9,
            })
            .unwrap();

        assert!(handle.rules().await.unwrap().is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_move_split_point() {
        let (_, handle, _) = spawn_with(quiet_config(), None);

        handle.move_split_point(0, Point::new(600.0, 300.0)).unwrap();
        let zones = handle.zones().await.unwrap();
        assert_eq!(zones[0].1, Rect::new(0.0, 0.0, 600.0, 300.0));
        assert_eq!(handle.layout().await.unwrap().split_points, vec![Point::new(600.0, 300.0)]);
    }

    #[tokio::test]
    async fn test_rename_zone_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let (_, handle, _) = spawn_with(quiet_config(), Some(path.clone()));

        handle.rename_zone(2, "Chat").unwrap();
        let summaries = handle.zone_summaries().await.unwrap();
        assert_eq!(summaries[1].display_name, "Chat");

        let saved = load_config_from_path(&path).unwrap();
        assert_eq!(saved.zones[1].display_name, "Chat");
    }

    #[tokio::test]
    async fn test_send_foreground_to_zone() {
        let (surface, handle, _) = spawn_with(quiet_config(), None);
        handle.monitor_state().await.unwrap();
        surface.open(window(5, "slack"));

        handle.send_foreground_to_zone(4).unwrap();
        let summaries = handle.zone_summaries().await.unwrap();
        assert_eq!(summaries[3].windows.len(), 1);
        assert_eq!(summaries[3].windows[0].title, "slack window");
    }

    #[tokio::test]
    async fn test_mode_and_opacity() {
        let (_, handle, _) = spawn_with(quiet_config(), None);

        assert_eq!(handle.mode().await.unwrap(), ZoneViewMode::Zone);
        handle.toggle_mode().unwrap();
        assert_eq!(handle.mode().await.unwrap(), ZoneViewMode::Desktop);
        handle.set_mode(ZoneViewMode::Edit).unwrap();
        assert_eq!(handle.mode().await.unwrap(), ZoneViewMode::Edit);

        handle.send(ZoneMessage::SetOverlayOpacity { opacity: 3.0 }).unwrap();
        assert!((handle.overlay_opacity().await.unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_shutdown_stops_actor() {
        let (_, handle, _) = spawn_with(quiet_config(), None);
        handle.shutdown().unwrap();

        let result = handle.mode().await;
        assert!(result.is_err());
    }
}
