//! Serialized task dispatchers
//!
//! Completions that originate on the engine's worker thread are never applied
//! there. They are posted here and run one at a time, in post order, on the
//! dispatcher's own context.

use halbridge_util::{HalError, Result};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// A unit of work posted to a dispatcher
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Single-threaded, FIFO task queue owned by the hosting service
pub trait TaskDispatcher: Send + Sync {
    /// Enqueue a task. No execution deadline is implied.
    fn post(&self, task: Task) -> Result<()>;
}

/// Dispatcher backed by a dedicated named thread
pub struct SerialDispatcher {
    name: String,
    sender: Mutex<Option<mpsc::UnboundedSender<Task>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
    thread_id: ThreadId,
}

impl SerialDispatcher {
    /// Spawn the dispatcher thread
    pub fn spawn(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let (tx, mut rx) = mpsc::unbounded_channel::<Task>();

        let handle = thread::Builder::new().name(name.clone()).spawn(move || {
            debug!("Dispatcher running");
            while let Some(task) = rx.blocking_recv() {
                task();
            }
            debug!("Dispatcher drained");
        })?;

        Ok(Self {
            name,
            thread_id: handle.thread().id(),
            sender: Mutex::new(Some(tx)),
            thread: Mutex::new(Some(handle)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the caller is running on the dispatcher thread
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Block until every task posted before this call has run.
    ///
    /// Must not be called from the dispatcher thread or from inside an async
    /// runtime.
    pub fn flush(&self) -> Result<()> {
        if self.is_current() {
            return Err(HalError::internal("flush called from the dispatcher thread"));
        }
        let (tx, rx) = oneshot::channel();
        self.post(Box::new(move || {
            let _ = tx.send(());
        }))?;
        rx.blocking_recv().map_err(|_| HalError::DispatcherClosed)
    }

    /// Stop accepting tasks, drain the queue and join the thread
    pub fn shutdown(&self) {
        if self.sender.lock().take().is_none() {
            return;
        }
        debug!(dispatcher = %self.name, "Dispatcher shutting down");

        let Some(handle) = self.thread.lock().take() else {
            return;
        };
        if self.is_current() {
            // Joining ourselves would deadlock; the thread exits once the queue drains.
            return;
        }
        if handle.join().is_err() {
            warn!(dispatcher = %self.name, "Dispatcher thread panicked");
        }
    }
}

impl TaskDispatcher for SerialDispatcher {
    fn post(&self, task: Task) -> Result<()> {
        let sender = self.sender.lock();
        let sender = sender.as_ref().ok_or(HalError::DispatcherClosed)?;
        sender.send(task).map_err(|_| HalError::DispatcherClosed)
    }
}

impl Drop for SerialDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// How long [`ManualDispatcher::wait_for_pending`] blocks before giving up
const MANUAL_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Dispatcher that only runs tasks when told to
///
/// Posted tasks queue up until `run_pending` or `run_one` is called, which
/// makes cross-thread completion ordering fully deterministic in tests.
#[derive(Default)]
pub struct ManualDispatcher {
    queue: Mutex<VecDeque<Task>>,
    posted: Condvar,
}

impl ManualDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Block until at least `count` tasks are queued. Returns false on timeout.
    pub fn wait_for_pending(&self, count: usize) -> bool {
        let mut queue = self.queue.lock();
        let result = self
            .posted
            .wait_while_for(&mut queue, |q| q.len() < count, MANUAL_WAIT_TIMEOUT);
        !result.timed_out()
    }

    /// Run the oldest queued task, if any
    pub fn run_one(&self) -> bool {
        // Pop under the lock, run outside it so tasks may post more work.
        let task = self.queue.lock().pop_front();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run queued tasks (including ones posted meanwhile) until the queue is empty
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while self.run_one() {
            ran += 1;
        }
        ran
    }
}

impl TaskDispatcher for ManualDispatcher {
    fn post(&self, task: Task) -> Result<()> {
        self.queue.lock().push_back(task);
        self.posted.notify_all();
        Ok(())
    }
}
