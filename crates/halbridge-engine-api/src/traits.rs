//! Legacy engine trait

use crate::EngineStatus;

/// Callback handed to [`LegacyEngine::cleanup`]
pub type CleanupHandler = Box<dyn FnOnce() + Send>;

/// The opaque legacy engine, as seen by the coordinator
///
/// Implementations are driven from at most two threads: the caller thread
/// (`initialize`, `cleanup`) and one worker thread (`run_event_loop`).
pub trait LegacyEngine: Send + Sync {
    /// Prepare the engine. Expected to be quick.
    fn initialize(&self) -> EngineStatus;

    /// Block inside the engine's event loop.
    ///
    /// Returns only after `cleanup` has been requested and the engine has
    /// torn itself down.
    fn run_event_loop(&self);

    /// Request teardown. Synchronous from the caller's point of view.
    ///
    /// `on_complete` may run before or after this returns. The event loop may
    /// also return before or after this returns.
    fn cleanup(&self, on_complete: CleanupHandler);
}
