//! Function-table shim over a vendor engine library

use halbridge_util::{HalError, Result};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::{CleanupHandler, EngineHandle, EngineStatus, LegacyEngine};

/// Callback the vendor `cleanup` entry point invokes once teardown is acknowledged
pub type CleanupCallback = fn(EngineHandle);

/// Entry points exported by a vendor engine library
#[derive(Debug, Clone, Copy)]
pub struct EngineFunctionTable {
    pub initialize: fn(&mut EngineHandle) -> i32,
    pub event_loop: fn(EngineHandle),
    pub cleanup: fn(EngineHandle, CleanupCallback),
}

fn stub_initialize(_handle: &mut EngineHandle) -> i32 {
    EngineStatus::NotSupported.as_raw()
}

fn stub_event_loop(_handle: EngineHandle) {}

fn stub_cleanup(handle: EngineHandle, callback: CleanupCallback) {
    callback(handle);
}

fn noop_cleanup_callback(_handle: EngineHandle) {}

impl Default for EngineFunctionTable {
    /// A table with every entry stubbed out; initialization reports `NotSupported`.
    fn default() -> Self {
        Self {
            initialize: stub_initialize,
            event_loop: stub_event_loop,
            cleanup: stub_cleanup,
        }
    }
}

/// [`LegacyEngine`] backed by an [`EngineFunctionTable`]
pub struct FunctionTableEngine {
    table: EngineFunctionTable,
    handle: Mutex<Option<EngineHandle>>,
}

impl FunctionTableEngine {
    /// Wrap an already-populated table
    pub fn new(table: EngineFunctionTable) -> Self {
        Self {
            table,
            handle: Mutex::new(None),
        }
    }

    /// Populate a table through the vendor's export function and wrap it
    pub fn load(populate: fn(&mut EngineFunctionTable) -> i32) -> Result<Self> {
        let mut table = EngineFunctionTable::default();
        let status = EngineStatus::from_raw(populate(&mut table));
        if !status.is_success() {
            return Err(HalError::engine_table(format!(
                "failed to populate function table: {status}"
            )));
        }
        Ok(Self::new(table))
    }

    /// Handle from the last successful initialization, if any
    pub fn handle(&self) -> Option<EngineHandle> {
        *self.handle.lock()
    }
}

impl LegacyEngine for FunctionTableEngine {
    fn initialize(&self) -> EngineStatus {
        let mut handle = EngineHandle::default();
        let status = EngineStatus::from_raw((self.table.initialize)(&mut handle));
        if status.is_success() {
            debug!(handle = %handle, "Engine initialized");
            *self.handle.lock() = Some(handle);
        }
        status
    }

    fn run_event_loop(&self) {
        let Some(handle) = self.handle() else {
            warn!("Event loop requested before engine initialization");
            return;
        };
        (self.table.event_loop)(handle);
    }

    // The vendor callback cannot carry a closure, so `on_complete` runs once
    // the table's cleanup has returned.
    fn cleanup(&self, on_complete: CleanupHandler) {
        let Some(handle) = self.handle.lock().take() else {
            warn!("Cleanup requested before engine initialization");
            on_complete();
            return;
        };
        (self.table.cleanup)(handle, noop_cleanup_callback);
        on_complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    static EVENT_LOOP_HANDLE: AtomicUsize = AtomicUsize::new(0);
    static CLEANUP_HANDLE: AtomicUsize = AtomicUsize::new(0);

    fn fake_initialize(handle: &mut EngineHandle) -> i32 {
        *handle = EngineHandle::from_raw(0x51);
        0
    }

    fn fake_event_loop(handle: EngineHandle) {
        EVENT_LOOP_HANDLE.store(handle.as_raw(), Ordering::SeqCst);
    }

    fn fake_cleanup(handle: EngineHandle, callback: CleanupCallback) {
        CLEANUP_HANDLE.store(handle.as_raw(), Ordering::SeqCst);
        callback(handle);
    }

    fn populate_fake(table: &mut EngineFunctionTable) -> i32 {
        table.initialize = fake_initialize;
        table.event_loop = fake_event_loop;
        table.cleanup = fake_cleanup;
        0
    }

    fn populate_broken(_table: &mut EngineFunctionTable) -> i32 {
        EngineStatus::Uninitialized.as_raw()
    }

    #[test]
    fn stub_table_reports_not_supported() {
        let engine = FunctionTableEngine::new(EngineFunctionTable::default());
        assert_eq!(engine.initialize(), EngineStatus::NotSupported);
        assert!(engine.handle().is_none());
    }

    #[test]
    fn load_rejects_failed_populate() {
        let result = FunctionTableEngine::load(populate_broken);
        assert!(matches!(result, Err(HalError::EngineTable(_))));
    }

    #[test]
    fn handle_is_forwarded_to_every_entry_point() {
        let engine = FunctionTableEngine::load(populate_fake).unwrap();
        assert!(engine.initialize().is_success());
        assert_eq!(engine.handle(), Some(EngineHandle::from_raw(0x51)));

        engine.run_event_loop();
        assert_eq!(EVENT_LOOP_HANDLE.load(Ordering::SeqCst), 0x51);

        let completed = Arc::new(AtomicBool::new(false));
        let flag = completed.clone();
        engine.cleanup(Box::new(move || flag.store(true, Ordering::SeqCst)));

        assert_eq!(CLEANUP_HANDLE.load(Ordering::SeqCst), 0x51);
        assert!(completed.load(Ordering::SeqCst));
        assert!(engine.handle().is_none());
    }

    #[test]
    fn cleanup_before_initialize_still_completes() {
        let engine = FunctionTableEngine::new(EngineFunctionTable::default());
        let completed = Arc::new(AtomicBool::new(false));
        let flag = completed.clone();
        engine.cleanup(Box::new(move || flag.store(true, Ordering::SeqCst)));
        assert!(completed.load(Ordering::SeqCst));
    }
}
