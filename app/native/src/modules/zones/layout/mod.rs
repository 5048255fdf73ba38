//! Zone layout engine.
//!
//! Turns a set of split lines into a numbered grid of zone rectangles that
//! exactly tiles the screen.
//!
//! # Line Sources
//!
//! - A split point `(x, y)` contributes one vertical and one horizontal line
//! - An extra vertical line contributes only `x`
//! - An extra horizontal line contributes only `y`
//!
//! # Numbering
//!
//! Zones are numbered row-major starting at 1. With one split point:
//!
//! ```text
//! ┌─────┬─────┐
//! │  1  │  2  │
//! ├─────┼─────┤
//! │  3  │  4  │
//! └─────┴─────┘
//! ```
//!
//! Ids are only stable while the ordered line set is unchanged.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::modules::zones::state::{Point, Rect};

/// Minimum distance between a split line and the screen edge.
pub const EDGE_MARGIN: f64 = 20.0;

/// Zone id → zone rectangle, ordered by id.
pub type ZoneMap = BTreeMap<u32, Rect>;

/// Computes the zone grid for the given split lines.
///
/// Every coordinate is clamped into `[edge + EDGE_MARGIN, opposite - EDGE_MARGIN]`
/// before use. Duplicate coordinates are kept and produce zero-width cells.
///
/// The result always has `(v + 1) * (h + 1)` entries and tiles `screen`.
#[must_use]
pub fn calc_zones(points: &[Point], extra_v: &[f64], extra_h: &[f64], screen: &Rect) -> ZoneMap {
    let xs = axis_coordinates(
        points.iter().map(|p| p.x).chain(extra_v.iter().copied()),
        screen.x,
        screen.right(),
    );
    let ys = axis_coordinates(
        points.iter().map(|p| p.y).chain(extra_h.iter().copied()),
        screen.y,
        screen.bottom(),
    );

    let mut zones = ZoneMap::new();
    let mut id = 1u32;
    for row in ys.windows(2) {
        for col in xs.windows(2) {
            zones.insert(id, Rect::new(col[0], row[0], col[1] - col[0], row[1] - row[0]));
            id += 1;
        }
    }
    zones
}

/// Builds the ordered coordinate list for one axis: the leading edge, the
/// clamped and sorted lines, then the trailing edge.
fn axis_coordinates(lines: impl Iterator<Item = f64>, start: f64, end: f64) -> Vec<f64> {
    let low = start + EDGE_MARGIN;
    let high = end - EDGE_MARGIN;

    let mut coords: Vec<f64> = lines.map(|line| clamp_line(line, low, high)).collect();
    coords.sort_by(f64::total_cmp);

    let mut axis = Vec::with_capacity(coords.len() + 2);
    axis.push(start);
    axis.extend(coords);
    axis.push(end);
    axis
}

/// Clamps a line into `[low, high]`.
///
/// A screen too small for both margins collapses every line onto its center.
/// NaN lines are treated as the center as well.
fn clamp_line(line: f64, low: f64, high: f64) -> f64 {
    if low > high || line.is_nan() {
        return f64::midpoint(low, high);
    }
    line.clamp(low, high)
}

/// Returns the screen center, the split point used to seed a fresh layout.
#[must_use]
pub fn default_split_point(screen: &Rect) -> Point { screen.center() }

/// Number of zones produced by the given line counts.
#[must_use]
pub const fn zone_count(points: usize, extra_v: usize, extra_h: usize) -> usize {
    (points + extra_v + 1) * (points + extra_h + 1)
}

// ============================================================================
// Editable Layout
// ============================================================================

/// The editable split geometry of a layout.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SplitLayout {
    /// Split points, each contributing one vertical and one horizontal line.
    #[serde(alias = "SplitPoints")]
    pub split_points: Vec<Point>,

    /// Standalone vertical lines (x only).
    #[serde(alias = "ExtraVLines")]
    pub extra_v_lines: Vec<f64>,

    /// Standalone horizontal lines (y only).
    #[serde(alias = "ExtraHLines")]
    pub extra_h_lines: Vec<f64>,
}

impl SplitLayout {
    /// A layout with a single split point at the center of `screen`.
    #[must_use]
    pub fn seeded(screen: &Rect) -> Self {
        Self {
            split_points: vec![default_split_point(screen)],
            ..Self::default()
        }
    }

    /// Returns true if the layout has no lines (a single full-screen zone).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.split_points.is_empty() && self.extra_v_lines.is_empty() && self.extra_h_lines.is_empty()
    }

    /// Computes the zones of this layout on `screen`.
    #[must_use]
    pub fn zones(&self, screen: &Rect) -> ZoneMap {
        calc_zones(&self.split_points, &self.extra_v_lines, &self.extra_h_lines, screen)
    }

    /// Number of zones this layout produces.
    #[must_use]
    pub fn zone_count(&self) -> usize {
        zone_count(self.split_points.len(), self.extra_v_lines.len(), self.extra_h_lines.len())
    }

    /// Moves the split point at `index`. Returns `false` if there is none.
    pub fn move_point(&mut self, index: usize, point: Point) -> bool {
        self.split_points.get_mut(index).map(|p| *p = point).is_some()
    }

    /// Adds a split point.
    pub fn add_point(&mut self, point: Point) { self.split_points.push(point); }

    /// Removes the split point at `index`.
    pub fn remove_point(&mut self, index: usize) -> bool {
        remove_at(&mut self.split_points, index)
    }

    /// Adds a standalone vertical line.
    pub fn add_vertical_line(&mut self, x: f64) { self.extra_v_lines.push(x); }

    /// Adds a standalone horizontal line.
    pub fn add_horizontal_line(&mut self, y: f64) { self.extra_h_lines.push(y); }

    /// Removes the standalone vertical line at `index`.
    pub fn remove_vertical_line(&mut self, index: usize) -> bool {
        remove_at(&mut self.extra_v_lines, index)
    }

    /// Removes the standalone horizontal line at `index`.
    pub fn remove_horizontal_line(&mut self, index: usize) -> bool {
        remove_at(&mut self.extra_h_lines, index)
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.split_points.clear();
        self.extra_v_lines.clear();
        self.extra_h_lines.clear();
    }
}

fn remove_at<T>(items: &mut Vec<T>, index: usize) -> bool {
    if index < items.len() {
        items.remove(index);
        true
    } else {
        false
    }
}
