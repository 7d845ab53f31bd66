//! FinSight Core - shared data model and foundation
//!
//! This crate defines the domain types, error handling, configuration, and
//! logging bootstrap shared by the FinSight client, controllers, and CLI.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use chrono;
pub use serde_json;
pub use tracing;
