//! Shared utilities for halbridge
//!
//! This crate provides:
//! - ID types (ObserverId)
//! - Error types
//! - Default paths for the configuration file

mod error;
mod ids;
mod paths;

pub use error::*;
pub use ids::*;
pub use paths::*;
