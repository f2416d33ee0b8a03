//! Caller-facing types for halbridge
//!
//! This crate defines the values observers and callers see:
//! - Failure categories and reasons
//! - Lifecycle states
//! - Lifecycle events and their envelope

mod events;
mod types;

pub use events::*;
pub use types::*;

/// Current API version
pub const API_VERSION: u32 = 1;
