//! Lifecycle coordinator for the legacy HAL engine
//!
//! This crate is the heart of halbridge, containing:
//! - The lifecycle state machine (Stopped -> Started -> Stopping -> Stopped)
//! - The two-signal stop rendezvous (cleanup call return + event loop exit)
//! - Observer registration and broadcast
//! - The serialized task dispatcher used to hand off worker-thread completions
//! - Translation of engine status codes into caller-facing failure reasons

mod coordinator;
mod dispatcher;
mod failure;
mod observer;
mod registry;

pub use coordinator::*;
pub use dispatcher::*;
pub use failure::*;
pub use observer::*;
pub use registry::*;
