//! End-to-end tests for the zone actor.
//!
//! These drive a spawned actor through its handle against the in-memory
//! window surface, with the configuration persisted to a temporary
//! directory.
//!
//! ## Running these tests
//! ```bash
//! cargo test -p zonerouter --test routing_integration
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;
use zonerouter_lib::config::{ZoneConfig, ZoneDefinition, load_config_from_path, save_config};
use zonerouter_lib::zones::{
    Display, DpiScale, MemorySurface, MonitorState, PickerOutcome, PickerRequest, Point, Rect,
    SplitLayout, WindowHandle, WindowInfo, ZoneActor, ZoneActorHandle, ZoneViewMode,
};

// ============================================================================
// Helpers
// ============================================================================

const SCREEN: Rect = Rect::new(0.0, 0.0, 1920.0, 1080.0);

struct Harness {
    _dir: TempDir,
    path: PathBuf,
    surface: Arc<MemorySurface>,
    handle: ZoneActorHandle,
    pickers: UnboundedReceiver<PickerRequest>,
}

impl Harness {
    /// Writes `config` to a temporary file, then loads it and spawns the
    /// actor the way the engine does at startup.
    fn start(config: &ZoneConfig, open: &[WindowInfo]) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        save_config(config, &path).unwrap();

        let surface = Arc::new(MemorySurface::new());
        for window in open {
            surface.open(window.clone());
        }

        let loaded = load_config_from_path(&path).unwrap();
        let display = Display::new(SCREEN, DpiScale::IDENTITY);
        let (handle, pickers) =
            ZoneActor::spawn(loaded, Some(path.clone()), display, surface.clone());

        Self { _dir: dir, path, surface, handle, pickers }
    }

    /// Polls once and waits until the poll has been handled.
    async fn tick(&self) {
        self.handle.tick().unwrap();
        self.handle.monitor_state().await.unwrap();
    }

    fn saved(&self) -> ZoneConfig { load_config_from_path(&self.path).unwrap() }
}

fn window(handle: u64, process: &str, title: &str) -> WindowInfo {
    WindowInfo::new(WindowHandle(handle), title, process, 100 + u32::try_from(handle).unwrap())
}

/// A seeded four-zone layout with zone 2 named "Notes" and bound to notepad.
/// The poll timer is slowed down so only explicit ticks poll.
fn notes_config() -> ZoneConfig {
    ZoneConfig {
        layout: SplitLayout::seeded(&SCREEN),
        zones: vec![ZoneDefinition {
            zone_id: 2,
            display_name: "Notes".to_string(),
            process_names: vec!["notepad".to_string()],
        }],
        poll_interval_ms: 3_600_000,
        ..ZoneConfig::default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_saved_rules_apply_to_windows_open_at_startup() {
    let h = Harness::start(&notes_config(), &[
        window(1, "notepad", "todo.txt"),
        window(2, "explorer", "Downloads"),
    ]);

    assert_eq!(h.handle.monitor_state().await.unwrap(), MonitorState::Polling);
    assert_eq!(h.surface.frame_of(WindowHandle(1)), Some(Rect::new(960.0, 0.0, 960.0, 540.0)));
    assert!(h.surface.moves().iter().all(|(handle, _)| *handle == WindowHandle(1)));

    // Windows open at startup are the baseline, not new arrivals.
    h.tick().await;
    assert_eq!(h.handle.pending_pickers().await.unwrap(), 0);
}

#[tokio::test]
async fn test_picker_choice_routes_and_persists() {
    let mut h = Harness::start(&notes_config(), &[]);
    h.handle.monitor_state().await.unwrap();

    h.surface.open(window(7, "Calc", "Calculator"));
    h.tick().await;

    let request = h.pickers.recv().await.unwrap();
    assert_eq!(request.window.handle, WindowHandle(7));
    assert_eq!(request.choices.len(), 4);
    assert_eq!(request.choices[1].display_name, "Notes");
    assert!(matches!(
        h.handle.monitor_state().await.unwrap(),
        MonitorState::PickerActive { .. }
    ));

    h.handle.resolve_picker(PickerOutcome::chosen(request.ticket, 4)).unwrap();
    let summaries = h.handle.zone_summaries().await.unwrap();

    assert_eq!(h.surface.frame_of(WindowHandle(7)), Some(Rect::new(960.0, 540.0, 960.0, 540.0)));
    assert_eq!(summaries[3].windows.len(), 1);
    assert_eq!(summaries[3].windows[0].title, "Calculator");

    let saved = h.saved();
    let zone4 = saved.zones.iter().find(|z| z.zone_id == 4).unwrap();
    assert_eq!(zone4.process_names, vec!["Calc".to_string()]);

    // A second window of the same process now routes without asking.
    h.surface.open(window(8, "calc", "Calculator (2)"));
    h.tick().await;
    assert_eq!(h.surface.frame_of(WindowHandle(8)), Some(Rect::new(960.0, 540.0, 960.0, 540.0)));
    assert!(h.pickers.try_recv().is_err());
}

#[tokio::test]
async fn test_pickers_are_presented_one_at_a_time() {
    let mut h = Harness::start(&notes_config(), &[]);
    h.handle.monitor_state().await.unwrap();

    h.surface.open(window(1, "paint", "untitled"));
    h.surface.open(window(2, "gimp", "image.xcf"));
    h.tick().await;

    let first = h.pickers.recv().await.unwrap();
    assert!(h.pickers.try_recv().is_err());
    assert_eq!(h.handle.pending_pickers().await.unwrap(), 1);

    h.handle.resolve_picker(PickerOutcome::dismissed(first.ticket)).unwrap();
    let second = h.pickers.recv().await.unwrap();
    assert_ne!(first.window.handle, second.window.handle);

    // Answering an old ticket again changes nothing.
    h.handle.resolve_picker(PickerOutcome::chosen(first.ticket, 1)).unwrap();
    assert_eq!(h.handle.rules().await.unwrap().len(), 1);
    assert!(matches!(
        h.handle.monitor_state().await.unwrap(),
        MonitorState::PickerActive { .. }
    ));
}

#[tokio::test]
async fn test_desktop_mode_passes_windows_through() {
    let mut h = Harness::start(&notes_config(), &[]);
    h.handle.set_mode(ZoneViewMode::Desktop).unwrap();
    assert_eq!(h.handle.mode().await.unwrap(), ZoneViewMode::Desktop);

    h.surface.open(window(3, "notepad", "draft.txt"));
    h.surface.open(window(4, "paint", "untitled"));
    h.tick().await;

    assert!(h.surface.moves().is_empty());
    assert!(h.pickers.try_recv().is_err());
    assert_eq!(h.handle.pending_pickers().await.unwrap(), 0);

    h.handle.toggle_mode().unwrap();
    assert_eq!(h.handle.mode().await.unwrap(), ZoneViewMode::Zone);

    // Windows seen in desktop mode stay untouched; new ones are routed.
    h.tick().await;
    assert!(h.surface.moves().is_empty());
    h.surface.open(window(5, "notepad", "notes.txt"));
    h.tick().await;
    assert_eq!(h.surface.moves(), vec![(WindowHandle(5), Rect::new(960.0, 0.0, 960.0, 540.0))]);
}

#[tokio::test]
async fn test_layout_edit_keeps_routing_consistent() {
    let h = Harness::start(&notes_config(), &[window(1, "notepad", "todo.txt")]);
    h.handle.monitor_state().await.unwrap();

    h.handle.move_split_point(0, Point::new(600.0, 400.0)).unwrap();
    let zones = h.handle.zones().await.unwrap();
    assert_eq!(zones[1], (2, Rect::new(600.0, 0.0, 1320.0, 400.0)));

    let saved = h.saved();
    assert_eq!(saved.layout.split_points.len(), 1);
    assert!((saved.layout.split_points[0].x - 600.0).abs() < f64::EPSILON);
    assert_eq!(saved.zones.len(), 4);

    // The window keeps its membership and follows its zone on the next route.
    h.surface.open(window(2, "notepad", "later.txt"));
    h.tick().await;
    assert_eq!(h.surface.frame_of(WindowHandle(2)), Some(Rect::new(600.0, 0.0, 1320.0, 400.0)));
    let summaries = h.handle.zone_summaries().await.unwrap();
    assert_eq!(summaries[1].windows.len(), 2);
}

#[tokio::test]
async fn test_closed_windows_leave_their_zone() {
    let h = Harness::start(&notes_config(), &[
        window(1, "notepad", "a.txt"),
        window(2, "notepad", "b.txt"),
    ]);
    assert_eq!(h.handle.zone_summaries().await.unwrap()[1].windows.len(), 2);

    assert!(h.surface.close(WindowHandle(1)));
    h.tick().await;

    let summaries = h.handle.zone_summaries().await.unwrap();
    assert_eq!(summaries[1].windows.len(), 1);
    assert_eq!(summaries[1].windows[0].handle, WindowHandle(2));
}

#[tokio::test]
async fn test_send_foreground_to_zone_binds_process() {
    let h = Harness::start(&notes_config(), &[window(9, "terminal", "~")]);
    h.handle.monitor_state().await.unwrap();

    h.handle.send_foreground_to_zone(3).unwrap();
    let rules = h.handle.rules().await.unwrap();

    assert!(rules.iter().any(|r| r.process_name == "terminal" && r.zone_id == 3));
    assert_eq!(h.surface.frame_of(WindowHandle(9)), Some(Rect::new(0.0, 540.0, 960.0, 540.0)));
    assert!(h.saved().zones.iter().any(|z| z.zone_id == 3 && z.process_names == ["terminal"]));
}

#[tokio::test]
async fn test_shutdown_stops_actor() {
    let h = Harness::start(&notes_config(), &[]);
    h.handle.monitor_state().await.unwrap();

    h.handle.shutdown().unwrap();
    tokio::time::timeout(Duration::from_secs(1), async {
        while h.handle.is_alive() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();

    assert!(h.handle.mode().await.is_err());
}
