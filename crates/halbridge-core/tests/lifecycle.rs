//! Integration tests for the lifecycle coordinator
//!
//! These drive the coordinator with the real serialized dispatcher and a
//! controllable mock engine, covering each stop interleaving end to end.

use halbridge_api::{FailureCategory, FailureReason, LifecycleEvent, LifecycleState};
use halbridge_core::{
    INIT_FAILED_DESCRIPTION, LifecycleCoordinator, LifecycleObserver, RecordingObserver,
    SerialDispatcher, Task, TaskDispatcher,
};
use halbridge_engine_api::{CleanupMode, EngineStatus, MockEngine};
use halbridge_util::Result;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const DISPATCHER_THREAD: &str = "it-dispatcher";

/// Forwards to a serial dispatcher and counts posts so tests can wait on them
struct CountingDispatcher {
    inner: SerialDispatcher,
    posts: Mutex<usize>,
    posted: Condvar,
}

impl CountingDispatcher {
    fn new() -> Self {
        Self {
            inner: SerialDispatcher::spawn(DISPATCHER_THREAD).unwrap(),
            posts: Mutex::new(0),
            posted: Condvar::new(),
        }
    }

    fn wait_for_posts(&self, count: usize) {
        let mut posts = self.posts.lock();
        let result = self
            .posted
            .wait_while_for(&mut posts, |p| *p < count, Duration::from_secs(5));
        assert!(!result.timed_out(), "timed out waiting for {count} posts");
    }

    fn flush(&self) {
        self.inner.flush().unwrap();
    }
}

impl TaskDispatcher for CountingDispatcher {
    fn post(&self, task: Task) -> Result<()> {
        self.inner.post(task)?;
        *self.posts.lock() += 1;
        self.posted.notify_all();
        Ok(())
    }
}

/// Records which thread delivered each stop notification
#[derive(Default)]
struct StopThreadObserver {
    threads: Mutex<Vec<Option<String>>>,
}

impl LifecycleObserver for StopThreadObserver {
    fn on_start(&self) {}

    fn on_start_failure(&self, _reason: FailureReason) {}

    fn on_stop(&self) {
        self.threads
            .lock()
            .push(thread::current().name().map(str::to_owned));
    }
}

struct Fixture {
    coordinator: LifecycleCoordinator,
    engine: Arc<MockEngine>,
    dispatcher: Arc<CountingDispatcher>,
    observer: Arc<RecordingObserver>,
    stop_threads: Arc<StopThreadObserver>,
}

fn fixture(engine: MockEngine) -> Fixture {
    let engine = Arc::new(engine);
    let dispatcher = Arc::new(CountingDispatcher::new());
    let coordinator = LifecycleCoordinator::new(dispatcher.clone(), engine.clone());

    let observer = Arc::new(RecordingObserver::new());
    let stop_threads = Arc::new(StopThreadObserver::default());
    coordinator.register_observer(observer.clone());
    coordinator.register_observer(stop_threads.clone());

    Fixture {
        coordinator,
        engine,
        dispatcher,
        observer,
        stop_threads,
    }
}

#[test]
fn test_start_success() {
    let f = fixture(MockEngine::new());

    f.coordinator.start();

    assert_eq!(f.observer.events(), vec![LifecycleEvent::Started]);
    assert!(f.coordinator.is_started());
    assert!(f.engine.wait_for_event_loop());

    f.coordinator.stop();
    assert!(f.observer.wait_for_stops(1));
}

#[test]
fn test_start_failure_not_supported() {
    let f = fixture(MockEngine::new().with_init_status(EngineStatus::NotSupported));

    f.coordinator.start();

    assert_eq!(
        f.observer.events(),
        vec![LifecycleEvent::StartFailed {
            reason: FailureReason::new(FailureCategory::NotSupported, INIT_FAILED_DESCRIPTION),
        }]
    );
    assert_eq!(f.coordinator.state(), LifecycleState::Stopped);
    assert!(!f.coordinator.is_started());
    assert_eq!(f.engine.event_loop_calls(), 0);
}

#[test]
fn test_cleanup_returns_before_event_loop_exit() {
    let f = fixture(MockEngine::new().with_cleanup_mode(CleanupMode::Deferred));
    f.coordinator.start();
    assert!(f.engine.wait_for_event_loop());

    f.coordinator.stop();
    f.dispatcher.flush();
    assert_eq!(f.observer.stops(), 0);
    assert_eq!(f.coordinator.state(), LifecycleState::Stopping);

    f.engine.finish_event_loop();
    assert!(f.observer.wait_for_stops(1));
    f.dispatcher.flush();

    assert_eq!(f.observer.stops(), 1);
    assert_eq!(f.coordinator.state(), LifecycleState::Stopped);
    // Event loop exit arrived second, so the dispatcher finalized
    assert_eq!(
        *f.stop_threads.threads.lock(),
        vec![Some(DISPATCHER_THREAD.to_string())]
    );
}

#[test]
fn test_event_loop_exit_before_cleanup_returns() {
    let f = fixture(MockEngine::new().with_cleanup_mode(CleanupMode::Hold));
    f.coordinator.start();
    assert!(f.engine.wait_for_event_loop());

    let stopper = {
        let coordinator = f.coordinator.clone();
        thread::Builder::new()
            .name("stopper".into())
            .spawn(move || coordinator.stop())
            .unwrap()
    };
    assert!(f.engine.wait_for_cleanup());

    // Completion task has run on the dispatcher, cleanup is still blocked
    f.dispatcher.wait_for_posts(1);
    f.dispatcher.flush();
    assert_eq!(f.observer.stops(), 0);
    assert_eq!(f.coordinator.state(), LifecycleState::Stopping);

    f.engine.release_cleanup();
    stopper.join().unwrap();

    assert_eq!(f.observer.stops(), 1);
    assert_eq!(f.coordinator.state(), LifecycleState::Stopped);
    // Cleanup return arrived second, so the stopping thread finalized
    assert_eq!(
        *f.stop_threads.threads.lock(),
        vec![Some("stopper".to_string())]
    );
}

#[test]
fn test_stop_when_already_stopped() {
    let f = fixture(MockEngine::new());

    f.coordinator.stop();

    assert_eq!(f.observer.events(), vec![LifecycleEvent::Stopped]);
    assert_eq!(f.engine.initialize_calls(), 0);
    assert_eq!(f.engine.cleanup_calls(), 0);
}

#[test]
fn test_repeated_stop_while_stopping_broadcasts_once() {
    let f = fixture(MockEngine::new().with_cleanup_mode(CleanupMode::Deferred));
    const CYCLES: usize = 10;

    for cycle in 1..=CYCLES {
        f.coordinator.start();
        assert!(f.engine.wait_for_event_loop());

        f.coordinator.stop();
        assert_eq!(f.coordinator.state(), LifecycleState::Stopping);
        f.coordinator.stop();
        assert_eq!(f.coordinator.state(), LifecycleState::Stopping);

        f.engine.finish_event_loop();
        assert!(f.observer.wait_for_stops(cycle));
        f.dispatcher.wait_for_posts(cycle);
        f.dispatcher.flush();
        assert_eq!(f.observer.stops(), cycle, "cycle {cycle}");
        assert_eq!(f.coordinator.state(), LifecycleState::Stopped);
    }

    assert_eq!(f.engine.cleanup_calls(), CYCLES);
}

#[test]
fn test_single_stop_broadcast_across_racing_cycles() {
    let f = fixture(MockEngine::new());
    const CYCLES: usize = 50;

    for cycle in 1..=CYCLES {
        f.coordinator.start();
        assert!(f.engine.wait_for_event_loop());

        // Cleanup ends the loop, so both completions race
        f.coordinator.stop();

        assert!(f.engine.wait_for_event_loop_exits(cycle));
        assert!(f.observer.wait_for_stops(cycle));
        f.dispatcher.wait_for_posts(cycle);
        f.dispatcher.flush();
        assert_eq!(f.observer.stops(), cycle, "cycle {cycle}");
        assert_eq!(f.coordinator.state(), LifecycleState::Stopped);
    }

    assert_eq!(f.observer.starts(), CYCLES);
    assert_eq!(f.engine.initialize_calls(), CYCLES);
    assert_eq!(f.engine.cleanup_calls(), CYCLES);
}

#[test]
fn test_entry_points_serialized_on_dispatcher() {
    let f = fixture(MockEngine::new());

    let coordinator = f.coordinator.clone();
    f.dispatcher
        .post(Box::new(move || coordinator.start()))
        .unwrap();
    assert!(f.engine.wait_for_event_loop());

    let coordinator = f.coordinator.clone();
    f.dispatcher
        .post(Box::new(move || coordinator.stop()))
        .unwrap();

    assert!(f.observer.wait_for_stops(1));
    f.dispatcher.flush();
    assert_eq!(
        f.observer.events(),
        vec![LifecycleEvent::Started, LifecycleEvent::Stopped]
    );
    assert_eq!(
        *f.stop_threads.threads.lock(),
        vec![Some(DISPATCHER_THREAD.to_string())]
    );
}
