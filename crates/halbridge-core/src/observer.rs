//! Lifecycle observers

use halbridge_api::{Event, FailureReason, LifecycleEvent};
use parking_lot::{Condvar, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Party notified of lifecycle transitions
///
/// Callbacks run synchronously on whichever thread performs the broadcast and
/// must not block for long. They may call back into the coordinator.
pub trait LifecycleObserver: Send + Sync {
    fn on_start(&self);

    fn on_start_failure(&self, reason: FailureReason);

    fn on_stop(&self);
}

/// Route a lifecycle event to the matching observer callback
pub fn deliver(observer: &dyn LifecycleObserver, event: &LifecycleEvent) {
    match event {
        LifecycleEvent::Started => observer.on_start(),
        LifecycleEvent::StartFailed { reason } => observer.on_start_failure(reason.clone()),
        LifecycleEvent::Stopped => observer.on_stop(),
    }
}

/// Observer that logs every event
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl LifecycleObserver for LoggingObserver {
    fn on_start(&self) {
        info!("HAL started");
    }

    fn on_start_failure(&self, reason: FailureReason) {
        warn!(
            category = %reason.category,
            description = %reason.description,
            "HAL failed to start"
        );
    }

    fn on_stop(&self) {
        info!("HAL stopped");
    }
}

/// Observer that forwards timestamped events into a channel
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, payload: LifecycleEvent) {
        // Receiver gone means nobody is listening anymore
        let _ = self.tx.send(Event::new(payload));
    }
}

impl LifecycleObserver for ChannelObserver {
    fn on_start(&self) {
        self.send(LifecycleEvent::Started);
    }

    fn on_start_failure(&self, reason: FailureReason) {
        self.send(LifecycleEvent::StartFailed { reason });
    }

    fn on_stop(&self) {
        self.send(LifecycleEvent::Stopped);
    }
}

/// How long [`RecordingObserver::wait_for`] blocks before giving up
const RECORD_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Observer that records events in arrival order, for tests
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<LifecycleEvent>>,
    changed: Condvar,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn starts(&self) -> usize {
        self.count(|e| matches!(e, LifecycleEvent::Started))
    }

    pub fn stops(&self) -> usize {
        self.count(|e| matches!(e, LifecycleEvent::Stopped))
    }

    pub fn failures(&self) -> Vec<FailureReason> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                LifecycleEvent::StartFailed { reason } => Some(reason.clone()),
                _ => None,
            })
            .collect()
    }

    /// Block until `ready` holds for the recorded events. Returns false on timeout.
    pub fn wait_for(&self, mut ready: impl FnMut(&[LifecycleEvent]) -> bool) -> bool {
        let mut events = self.events.lock();
        let result = self
            .changed
            .wait_while_for(&mut events, |e| !ready(e.as_slice()), RECORD_WAIT_TIMEOUT);
        !result.timed_out()
    }

    /// Block until at least `count` stop events were recorded
    pub fn wait_for_stops(&self, count: usize) -> bool {
        self.wait_for(|events| {
            events
                .iter()
                .filter(|e| matches!(e, LifecycleEvent::Stopped))
                .count()
                >= count
        })
    }

    fn count(&self, pred: impl Fn(&LifecycleEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }

    fn record(&self, event: LifecycleEvent) {
        self.events.lock().push(event);
        self.changed.notify_all();
    }
}

impl LifecycleObserver for RecordingObserver {
    fn on_start(&self) {
        self.record(LifecycleEvent::Started);
    }

    fn on_start_failure(&self, reason: FailureReason) {
        self.record(LifecycleEvent::StartFailed { reason });
    }

    fn on_stop(&self) {
        self.record(LifecycleEvent::Stopped);
    }
}
