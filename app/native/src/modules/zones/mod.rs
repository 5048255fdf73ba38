//! Zone Router - Screen Partitioning and Rule-Based Window Routing
//!
//! This module splits the screen into a grid of non-overlapping zones and
//! moves application windows into them using per-process rules:
//! - A pure layout engine turns split points and lines into zone rectangles
//! - A router owns zone geometry and window membership
//! - A monitor polls for new windows and serializes the zone picker
//! - An actor owns all of it on a single `tokio` task
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Window Surface (trait)                      │
//! │  (enumerate, move & resize, bring to front, foreground)     │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Window Monitor                             │
//! │  - Polls on a fixed interval                                │
//! │  - New windows: route by rule or queue for the picker       │
//! │  - One picker outstanding at a time                         │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │ Router operations            │ PickerRequest
//!                ▼                              ▼
//! ┌──────────────────────────────┐   ┌──────────────────────────┐
//! │           Router             │   │     Picker (external)    │
//! │  - zone id → pixel rect      │   │  replies: PickerOutcome  │
//! │  - zone id → window handles  │   └──────────────────────────┘
//! │  - Rule Store lookups        │
//! └──────────────────────────────┘
//!                ▲
//!                │ update_zones (logical → pixels)
//! ┌──────────────┴──────────────────────────────────────────────┐
//! │          Layout Engine (calc_zones, SplitLayout)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod actor;
pub mod layout;
pub mod monitor;
pub mod router;
pub mod rules;
pub mod state;
pub mod surface;

// Re-export commonly used types
pub use actor::{ActorError, QueryResult, ZoneActor, ZoneActorHandle, ZoneMessage, ZoneQuery};
pub use layout::{EDGE_MARGIN, SplitLayout, ZoneMap, calc_zones, default_split_point, zone_count};
pub use monitor::{
    MonitorState, PickerOutcome, PickerRequest, PickerTicket, Resolution, TickReport,
    WindowMonitor, ZoneChoice,
};
pub use router::{Router, ZoneMember, ZoneSummary};
pub use rules::{RoutingRule, RuleStore, ZoneLabel};
pub use state::{
    AppState, Display, DpiScale, Point, Rect, WindowHandle, WindowIdList, WindowInfo,
    ZoneViewMode,
};
pub use surface::{MemorySurface, SurfaceError, WindowSurface};
