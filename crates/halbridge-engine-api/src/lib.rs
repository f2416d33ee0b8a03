//! Legacy engine interface for halbridge
//!
//! This crate defines the boundary between the lifecycle coordinator and the
//! blocking, thread-unsafe legacy engine. It contains no engine logic itself:
//! the vendor library is reached through a fixed function table, and tests use
//! a controllable mock.

mod handle;
mod mock;
mod status;
mod table;
mod traits;

pub use handle::*;
pub use mock::*;
pub use status::*;
pub use table::*;
pub use traits::*;
