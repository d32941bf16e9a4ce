//! followharvest: long-running follower-graph harvester with a SQLite document store.

pub mod api;
pub mod engine;
pub mod store;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

/// Result alias used by public followharvest API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
