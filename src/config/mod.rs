//! Configuration loading and management for the Roster Engine.
//!
//! This module loads the roster policy (go-live date, default and remote
//! regimens, the consecutive accumulated-leave limit and the rounding rule)
//! from YAML.
//!
//! # Example
//!
//! ```no_run
//! use roster_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/roster").unwrap();
//! println!("Default regimen: {}", config.policy().default_regimen);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    DEFAULT_MAX_CONSECUTIVE_ACCUMULATED_LEAVE, RosterPolicy, default_go_live_date,
};
