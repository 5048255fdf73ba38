//! Core state types for the zone router.
//!
//! These types are shared by every component:
//! - `Rect` / `Point` are the geometry primitives (logical or pixel space)
//! - `DpiScale` / `Display` describe the screen the zones are laid out on
//! - `WindowHandle` / `WindowInfo` identify and describe OS windows
//! - `ZoneViewMode` is the process-wide view mode

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ============================================================================
// Geometry Types
// ============================================================================

/// A rectangle with position and size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create a zero-sized rectangle at origin.
    #[must_use]
    pub const fn zero() -> Self { Self::new(0.0, 0.0, 0.0, 0.0) }

    /// Right edge (exclusive).
    #[must_use]
    pub fn right(&self) -> f64 { self.x + self.width }

    /// Bottom edge (exclusive).
    #[must_use]
    pub fn bottom(&self) -> f64 { self.y + self.height }

    /// Check if this rectangle has valid dimensions.
    #[must_use]
    pub fn is_valid(&self) -> bool { self.width > 0.0 && self.height > 0.0 }

    /// Check if this rectangle contains a point.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check if this rectangle intersects with another.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Calculate the area of this rectangle.
    #[must_use]
    pub fn area(&self) -> f64 { self.width * self.height }

    /// Get the center point of this rectangle.
    #[must_use]
    pub fn center(&self) -> Point { Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0) }

    /// Convert a rectangle in logical units to device pixels.
    #[must_use]
    pub fn to_pixels(&self, scale: DpiScale) -> Self {
        Self::new(
            self.x * scale.x,
            self.y * scale.y,
            self.width * scale.x,
            self.height * scale.y,
        )
    }

    /// Check if two rectangles are approximately equal (within epsilon).
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.width - other.width).abs() < epsilon
            && (self.height - other.height).abs() < epsilon
    }
}

impl fmt::Display for Rect {
    #[allow(clippy::cast_possible_truncation)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} @ ({}, {})",
            self.width.round() as i64,
            self.height.round() as i64,
            self.x.round() as i64,
            self.y.round() as i64
        )
    }
}

/// A point in screen space.
///
/// As a split point it contributes one vertical line (`x`) and one
/// horizontal line (`y`) to the layout at the same time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    #[serde(alias = "X")]
    pub x: f64,
    #[serde(alias = "Y")]
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

// ============================================================================
// Display Types
// ============================================================================

/// Logical-to-device pixel scale of a display.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DpiScale {
    pub x: f64,
    pub y: f64,
}

impl Default for DpiScale {
    fn default() -> Self { Self::IDENTITY }
}

impl DpiScale {
    /// No scaling: logical units are device pixels.
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    /// Create a scale, replacing unusable factors with 1.0.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: sanitize_factor(x),
            y: sanitize_factor(y),
        }
    }

    /// Uniform scale on both axes.
    #[must_use]
    pub fn uniform(factor: f64) -> Self { Self::new(factor, factor) }
}

fn sanitize_factor(factor: f64) -> f64 {
    if factor.is_finite() && factor > 0.0 { factor } else { 1.0 }
}

/// The screen zones are laid out on.
///
/// `frame` is in logical units; `scale` is read once at startup and applied
/// whenever a zone rectangle is handed to the window surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Display {
    pub frame: Rect,
    pub scale: DpiScale,
}

impl Display {
    /// Create a display description.
    #[must_use]
    pub const fn new(frame: Rect, scale: DpiScale) -> Self { Self { frame, scale } }
}

// ============================================================================
// Window Types
// ============================================================================

/// Opaque OS window identifier.
///
/// Never dereferenced; only used as a key. A stored handle may refer to a
/// window that no longer exists, so membership is always re-validated against
/// a fresh enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:#x}", self.0) }
}

/// Ordered set of window handles. Inline storage covers the common case of a
/// zone holding a handful of windows.
pub type WindowIdList = SmallVec<[WindowHandle; 8]>;

/// Snapshot of a top-level window taken during enumeration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInfo {
    pub handle: WindowHandle,
    pub title: String,
    pub process_name: String,
    pub process_id: u32,
}

impl WindowInfo {
    /// Create a window snapshot.
    #[must_use]
    pub fn new(
        handle: WindowHandle,
        title: impl Into<String>,
        process_name: impl Into<String>,
        process_id: u32,
    ) -> Self {
        Self {
            handle,
            title: title.into(),
            process_name: process_name.into(),
            process_id,
        }
    }
}

// ============================================================================
// View Mode
// ============================================================================

/// Process-wide view mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneViewMode {
    /// Zones hidden, windows pass through untouched.
    Desktop,

    /// Zones active, overlay dimmed, new windows auto-routed.
    #[default]
    Zone,

    /// Layout editing with handles active.
    Edit,
}

impl ZoneViewMode {
    /// Returns the mode name as a static kebab-case string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Zone => "zone",
            Self::Edit => "edit",
        }
    }

    /// Returns true if newly appearing windows are routed in this mode.
    #[must_use]
    pub const fn routes_windows(self) -> bool { !matches!(self, Self::Desktop) }

    /// Returns true if split handles accept edits in this mode.
    #[must_use]
    pub const fn is_editing(self) -> bool { matches!(self, Self::Edit) }
}

impl fmt::Display for ZoneViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges_and_area() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
        assert_eq!(rect.area(), 5000.0);
        assert_eq!(rect.center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn test_rect_intersects_excludes_touching_edges() {
        let left = Rect::new(0.0, 0.0, 100.0, 100.0);
        let right = Rect::new(100.0, 0.0, 100.0, 100.0);
        assert!(!left.intersects(&right));
        assert!(left.intersects(&Rect::new(99.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_rect_to_pixels() {
        let rect = Rect::new(100.0, 50.0, 200.0, 100.0);
        let pixels = rect.to_pixels(DpiScale::new(1.5, 2.0));
        assert_eq!(pixels, Rect::new(150.0, 100.0, 300.0, 200.0));
    }

    #[test]
    fn test_rect_display() {
        assert_eq!(Rect::new(960.0, 0.0, 960.0, 540.0).to_string(), "960x540 @ (960, 0)");
    }

    #[test]
    fn test_dpi_scale_rejects_bad_factors() {
        assert_eq!(DpiScale::new(0.0, -1.0), DpiScale::IDENTITY);
        assert_eq!(DpiScale::new(f64::NAN, f64::INFINITY), DpiScale::IDENTITY);
        assert_eq!(DpiScale::uniform(1.25).x, 1.25);
    }

    #[test]
    fn test_window_handle_display_is_hex() {
        assert_eq!(WindowHandle(0x1f).to_string(), "0x1f");
    }

    #[test]
    fn test_view_mode_routing() {
        assert!(ZoneViewMode::Zone.routes_windows());
        assert!(ZoneViewMode::Edit.routes_windows());
        assert!(!ZoneViewMode::Desktop.routes_windows());
        assert!(ZoneViewMode::Edit.is_editing());
        assert_eq!(ZoneViewMode::default(), ZoneViewMode::Zone);
    }

    #[test]
    fn test_view_mode_serializes_kebab_case() {
        let json = serde_json::to_string(&ZoneViewMode::Desktop).unwrap();
        assert_eq!(json, "\"desktop\"");
    }

    #[test]
    fn test_point_accepts_legacy_field_names() {
        let point: Point = serde_json::from_str(r#"{"X": 12.5, "Y": 40}"#).unwrap();
        assert_eq!(point, Point::new(12.5, 40.0));
    }
}
