//! Observer registry and broadcast

use halbridge_api::LifecycleEvent;
use halbridge_util::ObserverId;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

use crate::{LifecycleObserver, deliver};

struct Registration {
    id: ObserverId,
    observer: Arc<dyn LifecycleObserver>,
}

/// Insertion-ordered set of lifecycle observers
///
/// Broadcasts iterate a snapshot taken when the broadcast begins, so an
/// observer registered mid-broadcast only sees later events.
#[derive(Default)]
pub struct CallbackRegistry {
    observers: Mutex<Vec<Registration>>,
}

fn same_observer(a: &Arc<dyn LifecycleObserver>, b: &Arc<dyn LifecycleObserver>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer. Registering the same observer twice returns its existing ID.
    pub fn register(&self, observer: Arc<dyn LifecycleObserver>) -> ObserverId {
        let mut observers = self.observers.lock();
        if let Some(existing) = observers
            .iter()
            .find(|r| same_observer(&r.observer, &observer))
        {
            return existing.id;
        }

        let id = ObserverId::new();
        observers.push(Registration { id, observer });
        debug!(observer_id = %id, count = observers.len(), "Observer registered");
        id
    }

    pub fn len(&self) -> usize {
        self.observers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.lock().is_empty()
    }

    /// Invoke every registered observer once, in registration order, on the calling thread
    pub fn broadcast(&self, event: &LifecycleEvent) {
        let snapshot: Vec<(ObserverId, Arc<dyn LifecycleObserver>)> = self
            .observers
            .lock()
            .iter()
            .map(|r| (r.id, r.observer.clone()))
            .collect();

        for (id, observer) in snapshot {
            let delivered =
                panic::catch_unwind(AssertUnwindSafe(|| deliver(observer.as_ref(), event)));
            if delivered.is_err() {
                error!(observer_id = %id, event = ?event, "Observer panicked during broadcast");
            }
        }
    }
}
