//! Configuration loading and types for the roster engine.
//!
//! The engine's tunable values (fixed UTC offset, overtime multiplier,
//! half-day leave defaults) live in a YAML file and are loaded at startup.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    DEFAULT_WORKDAY_MINUTES, EngineConfig, EngineSettings, LeaveSettings, OvertimeSettings,
    TimezoneSettings,
};
