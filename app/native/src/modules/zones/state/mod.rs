//! Application state owned by the zone actor.
//!
//! `AppState` replaces process-wide globals: it holds the current
//! [`ZoneViewMode`] and overlay opacity, and publishes mode changes through a
//! `tokio::sync::watch` channel so any number of observers can follow along.

mod types;

use tokio::sync::watch;
pub use types::{
    Display, DpiScale, Point, Rect, WindowHandle, WindowIdList, WindowInfo, ZoneViewMode,
};

/// Default overlay opacity for a fresh configuration.
pub const DEFAULT_OVERLAY_OPACITY: f64 = 0.12;

/// Explicitly owned application state.
#[derive(Debug)]
pub struct AppState {
    mode: watch::Sender<ZoneViewMode>,
    overlay_opacity: f64,
}

impl Default for AppState {
    fn default() -> Self { Self::new(ZoneViewMode::default(), DEFAULT_OVERLAY_OPACITY) }
}

impl AppState {
    /// Create the state with an initial mode and overlay opacity.
    #[must_use]
    pub fn new(mode: ZoneViewMode, overlay_opacity: f64) -> Self {
        let (mode, _) = watch::channel(mode);
        Self {
            mode,
            overlay_opacity: clamp_opacity(overlay_opacity),
        }
    }

    /// Current view mode.
    #[must_use]
    pub fn mode(&self) -> ZoneViewMode { *self.mode.borrow() }

    /// Switch to `mode`. Observers are only notified when the mode changes.
    ///
    /// Returns `true` if the mode changed.
    pub fn set_mode(&self, mode: ZoneViewMode) -> bool {
        let changed = self.mode.send_if_modified(|current| {
            if *current == mode {
                return false;
            }
            *current = mode;
            true
        });
        if changed {
            tracing::info!(mode = %mode, "zones: view mode changed");
        }
        changed
    }

    /// Flip between zone and desktop mode. Leaving edit mode returns to zone mode.
    pub fn toggle(&self) -> ZoneViewMode {
        let next = match self.mode() {
            ZoneViewMode::Zone => ZoneViewMode::Desktop,
            ZoneViewMode::Desktop | ZoneViewMode::Edit => ZoneViewMode::Zone,
        };
        self.set_mode(next);
        next
    }

    /// Subscribe to mode changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ZoneViewMode> { self.mode.subscribe() }

    /// Overlay opacity in `[0, 1]`.
    #[must_use]
    pub const fn overlay_opacity(&self) -> f64 { self.overlay_opacity }

    /// Set overlay opacity, clamped to `[0, 1]`.
    pub fn set_overlay_opacity(&mut self, opacity: f64) -> f64 {
        self.overlay_opacity = clamp_opacity(opacity);
        self.overlay_opacity
    }
}

/// Clamp an opacity value to `[0, 1]`, mapping NaN to the default.
#[must_use]
pub fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        DEFAULT_OVERLAY_OPACITY
    } else {
        opacity.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = AppState::default();
        assert_eq!(state.mode(), ZoneViewMode::Zone);
        assert!((state.overlay_opacity() - DEFAULT_OVERLAY_OPACITY).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_mode_notifies_only_on_change() {
        let state = AppState::default();
        let mut observer = state.subscribe();
        observer.mark_unchanged();

        assert!(!state.set_mode(ZoneViewMode::Zone));
        assert!(!observer.has_changed().unwrap());

        assert!(state.set_mode(ZoneViewMode::Edit));
        assert!(observer.has_changed().unwrap());
        assert_eq!(*observer.borrow_and_update(), ZoneViewMode::Edit);
    }

    #[test]
    fn test_toggle_cycles_zone_and_desktop() {
        let state = AppState::default();
        assert_eq!(state.toggle(), ZoneViewMode::Desktop);
        assert_eq!(state.toggle(), ZoneViewMode::Zone);

        state.set_mode(ZoneViewMode::Edit);
        assert_eq!(state.toggle(), ZoneViewMode::Zone);
    }

    #[test]
    fn test_overlay_opacity_is_clamped() {
        let mut state = AppState::new(ZoneViewMode::Desktop, 4.0);
        assert!((state.overlay_opacity() - 1.0).abs() < f64::EPSILON);
        assert!(state.set_overlay_opacity(-0.5).abs() < f64::EPSILON);
        assert!((clamp_opacity(f64::NAN) - DEFAULT_OVERLAY_OPACITY).abs() < f64::EPSILON);
    }
}
