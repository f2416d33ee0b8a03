//! Mock engine for testing

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::{CleanupHandler, EngineStatus, LegacyEngine};

/// How long the `wait_for_*` helpers block before giving up
pub const MOCK_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// What [`MockEngine::cleanup`] does with the running event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupMode {
    /// Release the event loop, then return
    #[default]
    EndLoop,
    /// Return without touching the event loop; call `finish_event_loop` later
    Deferred,
    /// Release the event loop, then block until `release_cleanup`
    Hold,
}

#[derive(Debug, Default)]
struct MockState {
    init_status: Option<EngineStatus>,
    cleanup_mode: CleanupMode,
    loop_running: bool,
    loop_released: bool,
    cleanup_released: bool,
    in_cleanup: bool,
    initialize_calls: usize,
    event_loop_calls: usize,
    event_loop_exits: usize,
    cleanup_calls: usize,
}

/// Deterministic fake engine for unit/integration testing
///
/// The event loop blocks until cleanup (or the test) releases it, so tests
/// decide exactly when each completion signal fires.
#[derive(Default)]
pub struct MockEngine {
    state: Mutex<MockState>,
    changed: Condvar,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_init_status(self, status: EngineStatus) -> Self {
        self.set_init_status(status);
        self
    }

    pub fn with_cleanup_mode(self, mode: CleanupMode) -> Self {
        self.set_cleanup_mode(mode);
        self
    }

    /// Configure what the next `initialize` returns
    pub fn set_init_status(&self, status: EngineStatus) {
        self.state.lock().init_status = Some(status);
    }

    pub fn set_cleanup_mode(&self, mode: CleanupMode) {
        self.state.lock().cleanup_mode = mode;
    }

    /// Let a running (or about to run) event loop return
    pub fn finish_event_loop(&self) {
        self.state.lock().loop_released = true;
        self.changed.notify_all();
    }

    /// Let a held cleanup call return
    pub fn release_cleanup(&self) {
        self.state.lock().cleanup_released = true;
        self.changed.notify_all();
    }

    pub fn initialize_calls(&self) -> usize {
        self.state.lock().initialize_calls
    }

    pub fn event_loop_calls(&self) -> usize {
        self.state.lock().event_loop_calls
    }

    pub fn event_loop_exits(&self) -> usize {
        self.state.lock().event_loop_exits
    }

    pub fn cleanup_calls(&self) -> usize {
        self.state.lock().cleanup_calls
    }

    pub fn is_event_loop_running(&self) -> bool {
        self.state.lock().loop_running
    }

    /// Block until the event loop is running. Returns false on timeout.
    pub fn wait_for_event_loop(&self) -> bool {
        self.wait_until(|s| s.loop_running)
    }

    /// Block until `count` event loops have returned. Returns false on timeout.
    pub fn wait_for_event_loop_exits(&self, count: usize) -> bool {
        self.wait_until(|s| s.event_loop_exits >= count)
    }

    /// Block until a cleanup call is in progress. Returns false on timeout.
    pub fn wait_for_cleanup(&self) -> bool {
        self.wait_until(|s| s.in_cleanup)
    }

    fn wait_until(&self, mut ready: impl FnMut(&MockState) -> bool) -> bool {
        let mut state = self.state.lock();
        let result = self
            .changed
            .wait_while_for(&mut state, |s| !ready(s), MOCK_WAIT_TIMEOUT);
        !result.timed_out()
    }

    fn block_while(
        &self,
        state: &mut MutexGuard<'_, MockState>,
        cond: impl FnMut(&mut MockState) -> bool,
    ) {
        self.changed.wait_while(state, cond);
    }
}

impl LegacyEngine for MockEngine {
    fn initialize(&self) -> EngineStatus {
        let mut state = self.state.lock();
        state.initialize_calls += 1;
        let status = state.init_status.unwrap_or(EngineStatus::Success);
        if status.is_success() {
            state.loop_released = false;
            state.cleanup_released = false;
        }
        status
    }

    fn run_event_loop(&self) {
        let mut state = self.state.lock();
        state.event_loop_calls += 1;
        state.loop_running = true;
        self.changed.notify_all();

        self.block_while(&mut state, |s| !s.loop_released);

        state.loop_running = false;
        state.event_loop_exits += 1;
        self.changed.notify_all();
    }

    fn cleanup(&self, on_complete: CleanupHandler) {
        {
            let mut state = self.state.lock();
            state.cleanup_calls += 1;
            state.in_cleanup = true;
            match state.cleanup_mode {
                CleanupMode::EndLoop => state.loop_released = true,
                CleanupMode::Deferred => {}
                CleanupMode::Hold => {
                    state.loop_released = true;
                    self.changed.notify_all();
                    self.block_while(&mut state, |s| !s.cleanup_released);
                }
            }
            state.in_cleanup = false;
            self.changed.notify_all();
        }
        on_complete();
    }
}
