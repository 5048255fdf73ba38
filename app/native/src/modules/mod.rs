//! Application feature modules for ZoneRouter.
//!
//! - [`zones`] - Zone layout, rule-based window routing and the window monitor

pub mod zones;
