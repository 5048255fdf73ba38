//! Window surface collaborator.
//!
//! The router never talks to the OS directly. Everything it needs from the
//! platform's window API goes through [`WindowSurface`]:
//!
//! - enumerating visible top-level windows (no child windows, no tool
//!   windows, none of our own windows)
//! - moving and resizing a window in device pixels, restoring it first if it
//!   is minimized
//! - bringing a window to the front and reading the foreground window
//!
//! [`MemorySurface`] is an in-memory implementation used for headless runs
//! and tests.

use std::collections::HashSet;

use parking_lot::Mutex;

use crate::modules::zones::state::{Rect, WindowHandle, WindowInfo};

/// Errors reported by a window surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// Window enumeration failed.
    #[error("window enumeration failed: {0}")]
    Enumeration(String),

    /// The window no longer exists.
    #[error("window {0} no longer exists")]
    WindowGone(WindowHandle),

    /// The OS rejected a move or resize.
    #[error("failed to move window {handle}: {reason}")]
    MoveFailed { handle: WindowHandle, reason: String },

    /// Any other platform failure.
    #[error("platform error: {0}")]
    Platform(String),
}

/// Platform window API used by the router.
///
/// Calls are expected to be fast and non-blocking; they run on the router's
/// control flow between timer ticks.
pub trait WindowSurface: Send + Sync {
    /// Lists visible top-level windows.
    ///
    /// # Errors
    ///
    /// Returns an error if enumeration fails as a whole.
    fn visible_windows(&self) -> Result<Vec<WindowInfo>, SurfaceError>;

    /// Restores `handle` if minimized and moves it to `rect` (device pixels).
    ///
    /// # Errors
    ///
    /// Returns an error if the window is gone or the OS rejects the move.
    fn move_and_resize(&self, handle: WindowHandle, rect: &Rect) -> Result<(), SurfaceError>;

    /// Restores `handle` if minimized and makes it the foreground window.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is gone.
    fn bring_to_front(&self, handle: WindowHandle) -> Result<(), SurfaceError>;

    /// The current foreground window, if any.
    fn foreground_window(&self) -> Option<WindowHandle>;
}

// ============================================================================
// In-memory Surface
// ============================================================================

#[derive(Debug, Clone)]
struct SurfaceWindow {
    info: WindowInfo,
    frame: Rect,
    minimized: bool,
}

#[derive(Debug, Default)]
struct SurfaceInner {
    windows: Vec<SurfaceWindow>,
    foreground: Option<WindowHandle>,
    fail_enumeration: bool,
    rejected: HashSet<WindowHandle>,
    moves: Vec<(WindowHandle, Rect)>,
    enumerations: usize,
}

/// In-memory window surface.
///
/// Windows are kept in z-order of opening; the most recently opened or
/// fronted window becomes the foreground window. Failures can be injected to
/// exercise error paths.
#[derive(Debug, Default)]
pub struct MemorySurface {
    inner: Mutex<SurfaceInner>,
}

impl MemorySurface {
    /// Create an empty surface.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Opens a window and makes it the foreground window.
    pub fn open(&self, info: WindowInfo) {
        let mut inner = self.inner.lock();
        inner.windows.retain(|w| w.info.handle != info.handle);
        inner.foreground = Some(info.handle);
        inner.windows.push(SurfaceWindow {
            info,
            frame: Rect::zero(),
            minimized: false,
        });
    }

    /// Closes a window. Returns `false` if it was not open.
    pub fn close(&self, handle: WindowHandle) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.windows.len();
        inner.windows.retain(|w| w.info.handle != handle);
        if inner.foreground == Some(handle) {
            inner.foreground = inner.windows.last().map(|w| w.info.handle);
        }
        inner.windows.len() != before
    }

    /// Minimizes a window.
    pub fn minimize(&self, handle: WindowHandle) {
        if let Some(window) = self.inner.lock().windows.iter_mut().find(|w| w.info.handle == handle) {
            window.minimized = true;
        }
    }

    /// Makes every enumeration fail until reset.
    pub fn set_fail_enumeration(&self, fail: bool) { self.inner.lock().fail_enumeration = fail; }

    /// Makes moves of `handle` fail until reset.
    pub fn set_reject_moves(&self, handle: WindowHandle, reject: bool) {
        let mut inner = self.inner.lock();
        if reject {
            inner.rejected.insert(handle);
        } else {
            inner.rejected.remove(&handle);
        }
    }

    /// Every successful move so far, in order.
    #[must_use]
    pub fn moves(&self) -> Vec<(WindowHandle, Rect)> { self.inner.lock().moves.clone() }

    /// Current frame of a window.
    #[must_use]
    pub fn frame_of(&self, handle: WindowHandle) -> Option<Rect> {
        self.inner.lock().windows.iter().find(|w| w.info.handle == handle).map(|w| w.frame)
    }

    /// Returns true if the window is minimized.
    #[must_use]
    pub fn is_minimized(&self, handle: WindowHandle) -> bool {
        self.inner.lock().windows.iter().any(|w| w.info.handle == handle && w.minimized)
    }

    /// Number of enumerations performed.
    #[must_use]
    pub fn enumerations(&self) -> usize { self.inner.lock().enumerations }
}

impl WindowSurface for MemorySurface {
    fn visible_windows(&self) -> Result<Vec<WindowInfo>, SurfaceError> {
        let mut inner = self.inner.lock();
        inner.enumerations += 1;
        if inner.fail_enumeration {
            return Err(SurfaceError::Enumeration("injected failure".to_string()));
        }
        Ok(inner.windows.iter().map(|w| w.info.clone()).collect())
    }

    fn move_and_resize(&self, handle: WindowHandle, rect: &Rect) -> Result<(), SurfaceError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if inner.rejected.contains(&handle) {
            return Err(SurfaceError::MoveFailed {
                handle,
                reason: "rejected".to_string(),
            });
        }
        let window = inner
            .windows
            .iter_mut()
            .find(|w| w.info.handle == handle)
            .ok_or(SurfaceError::WindowGone(handle))?;
        window.minimized = false;
        window.frame = *rect;
        inner.moves.push((handle, *rect));
        Ok(())
    }

    fn bring_to_front(&self, handle: WindowHandle) -> Result<(), SurfaceError> {
        let mut inner = self.inner.lock();
        let index = inner
            .windows
            .iter()
            .position(|w| w.info.handle == handle)
            .ok_or(SurfaceError::WindowGone(handle))?;
        let mut window = inner.windows.remove(index);
        window.minimized = false;
        inner.windows.push(window);
        inner.foreground = Some(handle);
        Ok(())
    }

    fn foreground_window(&self) -> Option<WindowHandle> { self.inner.lock().foreground }
}
