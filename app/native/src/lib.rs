//! ZoneRouter - split the screen into zones and route windows into them.
//!
//! The library holds the zone engine (layout, router, window monitor and the
//! actor that owns them), persisted configuration and the CLI used to manage
//! that configuration.

pub mod cli;
pub mod config;
pub mod error;
pub mod modules;

pub use modules::zones;
