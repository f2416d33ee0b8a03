//! Lifecycle coordinator
//!
//! Drives the blocking legacy engine through an asynchronous start/stop
//! contract. Stopping completes only once two independent signals have both
//! arrived: the synchronous cleanup call returning on the caller's thread, and
//! the event loop exiting on the worker thread (handed back via the
//! dispatcher). Whichever arrives second finalizes, exactly once.

use halbridge_api::{FailureCategory, LifecycleEvent, LifecycleState};
use halbridge_engine_api::LegacyEngine;
use halbridge_util::{HalError, ObserverId, Result};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    CallbackRegistry, LifecycleObserver, TaskDispatcher, failure_reason, translate_engine_failure,
};

/// Description reported when a start is rejected during shutdown
pub const STOPPING_DESCRIPTION: &str = "HAL is stopping";

/// Base description for engine initialization failures
pub const INIT_FAILED_DESCRIPTION: &str = "Failed to initialize HAL";

/// Description reported when the event loop thread cannot be created
pub const SPAWN_FAILED_DESCRIPTION: &str = "Failed to spawn HAL event loop thread";

/// Default name of the worker thread blocking in the engine's event loop
pub const DEFAULT_EVENT_LOOP_THREAD: &str = "halbridge-event-loop";

/// State machine plus the two stop-completion flags
///
/// Both flags are false whenever `state` is not `Stopping`.
#[derive(Debug, Default)]
struct Lifecycle {
    state: LifecycleState,
    cleanup_call_pending: bool,
    event_loop_pending: bool,
    worker: Option<JoinHandle<()>>,
}

struct Shared {
    dispatcher: Arc<dyn TaskDispatcher>,
    engine: Arc<dyn LegacyEngine>,
    observers: CallbackRegistry,
    event_loop_thread: String,
    // Re-entrant so observers may call back in during a broadcast. The RefCell
    // borrow is never held across a broadcast or an engine call.
    lifecycle: ReentrantMutex<RefCell<Lifecycle>>,
}

/// Start/stop coordinator for the legacy engine
///
/// Public entry points are expected to be serialized by the caller (for
/// example by running them on the dispatcher). Cloning yields another handle
/// to the same coordinator.
#[derive(Clone)]
pub struct LifecycleCoordinator {
    shared: Arc<Shared>,
}

impl LifecycleCoordinator {
    /// Create a coordinator for an engine that has not been started yet
    pub fn new(dispatcher: Arc<dyn TaskDispatcher>, engine: Arc<dyn LegacyEngine>) -> Self {
        Self {
            shared: Arc::new(Shared {
                dispatcher,
                engine,
                observers: CallbackRegistry::new(),
                event_loop_thread: DEFAULT_EVENT_LOOP_THREAD.into(),
                lifecycle: ReentrantMutex::new(RefCell::new(Lifecycle::default())),
            }),
        }
    }

    /// Override the worker thread name. Only valid before the coordinator is shared.
    pub fn with_event_loop_thread_name(mut self, name: impl Into<String>) -> Self {
        if let Some(shared) = Arc::get_mut(&mut self.shared) {
            shared.event_loop_thread = name.into();
        } else {
            warn!("Event loop thread name ignored: coordinator already shared");
        }
        self
    }

    /// Add an observer. It is not told about the current state.
    pub fn register_observer(&self, observer: Arc<dyn LifecycleObserver>) -> ObserverId {
        self.shared.observers.register(observer)
    }

    /// True unless fully stopped
    pub fn is_started(&self) -> bool {
        self.state().is_started()
    }

    pub fn state(&self) -> LifecycleState {
        self.shared.lifecycle.lock().borrow().state
    }

    /// Initialize the engine and spawn the event loop thread
    ///
    /// Outcome is reported to observers: `on_start` on success (or when
    /// already started), `on_start_failure` otherwise.
    pub fn start(&self) {
        let shared = &self.shared;
        let guard = shared.lifecycle.lock();

        let state = guard.borrow().state;
        match state {
            LifecycleState::Started => {
                debug!("HAL already started");
                shared.observers.broadcast(&LifecycleEvent::Started);
                return;
            }
            LifecycleState::Stopping => {
                warn!("Start rejected, HAL is stopping");
                let reason = failure_reason(FailureCategory::NotAvailable, STOPPING_DESCRIPTION);
                shared
                    .observers
                    .broadcast(&LifecycleEvent::StartFailed { reason });
                return;
            }
            LifecycleState::Stopped => {}
        }

        info!("Initializing HAL");
        let status = shared.engine.initialize();
        if !status.is_success() {
            error!(status = %status, "Failed to initialize HAL");
            let reason = translate_engine_failure(status, INIT_FAILED_DESCRIPTION);
            shared
                .observers
                .broadcast(&LifecycleEvent::StartFailed { reason });
            return;
        }

        let worker = match Shared::spawn_event_loop(shared) {
            Ok(worker) => worker,
            Err(e) => {
                error!(error = %e, "Failed to spawn HAL event loop thread");
                let reason =
                    failure_reason(FailureCategory::NotAvailable, SPAWN_FAILED_DESCRIPTION);
                shared
                    .observers
                    .broadcast(&LifecycleEvent::StartFailed { reason });
                return;
            }
        };

        {
            let mut lifecycle = guard.borrow_mut();
            lifecycle.state = LifecycleState::Started;
            lifecycle.worker = Some(worker);
        }
        info!("HAL started");
        shared.observers.broadcast(&LifecycleEvent::Started);
    }

    /// Request engine cleanup
    ///
    /// Idempotent while stopping. On an already stopped coordinator this
    /// re-broadcasts `on_stop` without touching the engine.
    pub fn stop(&self) {
        let shared = &self.shared;
        {
            let guard = shared.lifecycle.lock();
            let state = guard.borrow().state;
            match state {
                LifecycleState::Stopped => {
                    debug!("HAL already stopped");
                    shared.observers.broadcast(&LifecycleEvent::Stopped);
                    return;
                }
                LifecycleState::Stopping => {
                    debug!("HAL stop already in progress");
                    return;
                }
                LifecycleState::Started => {
                    let mut lifecycle = guard.borrow_mut();
                    lifecycle.cleanup_call_pending = true;
                    lifecycle.event_loop_pending = true;
                    lifecycle.state = LifecycleState::Stopping;
                }
            }
        }

        // Lock released so the event-loop completion can land while cleanup blocks.
        info!("Cleaning up HAL");
        shared
            .engine
            .cleanup(Box::new(|| debug!("HAL cleanup callback invoked")));

        let guard = shared.lifecycle.lock();
        guard.borrow_mut().cleanup_call_pending = false;
        debug!("HAL cleanup command complete");
        shared.try_finalize(&guard);
    }
}

impl Shared {
    fn spawn_event_loop(shared: &Arc<Shared>) -> Result<JoinHandle<()>> {
        let worker_shared = shared.clone();
        let handle = thread::Builder::new()
            .name(shared.event_loop_thread.clone())
            .spawn(move || worker_shared.run_event_loop())?;
        Ok(handle)
    }

    /// Worker thread body: block in the engine, then hand back to the dispatcher
    fn run_event_loop(self: Arc<Self>) {
        debug!("Starting HAL event loop");
        self.engine.run_event_loop();
        debug!("HAL event loop terminated");

        let shared = self.clone();
        if let Err(e) = self
            .dispatcher
            .post(Box::new(move || shared.on_event_loop_exit()))
        {
            error!(error = %e, "Failed to post HAL event loop completion");
        }
    }

    /// Runs on the dispatcher after the worker's event loop returned
    fn on_event_loop_exit(&self) {
        let guard = self.lifecycle.lock();
        let state = guard.borrow().state;
        if let Err(e) = check_event_loop_exit(state) {
            error!(error = %e, "Engine and coordinator diverged");
            std::process::abort();
        }

        {
            let mut lifecycle = guard.borrow_mut();
            lifecycle.event_loop_pending = false;
            // The worker has nothing left to do; release it without joining.
            drop(lifecycle.worker.take());
        }
        self.try_finalize(&guard);
    }

    /// Move Stopping -> Stopped and broadcast, once both completions are in
    fn try_finalize(&self, lifecycle: &RefCell<Lifecycle>) {
        let finished = {
            let mut lifecycle = lifecycle.borrow_mut();
            let done = lifecycle.state == LifecycleState::Stopping
                && !lifecycle.cleanup_call_pending
                && !lifecycle.event_loop_pending;
            if done {
                lifecycle.state = LifecycleState::Stopped;
            }
            done
        };

        if finished {
            info!("HAL cleanup complete");
            self.observers.broadcast(&LifecycleEvent::Stopped);
        }
    }
}

/// The event loop may only return because a stop asked it to
pub fn check_event_loop_exit(state: LifecycleState) -> Result<()> {
    if state != LifecycleState::Stopping {
        return Err(HalError::internal(format!(
            "HAL event loop terminated, but HAL was not stopping (state: {state:?})"
        )));
    }
    Ok(())
}
