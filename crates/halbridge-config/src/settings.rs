//! Validated configuration structures

use crate::schema::{RawConfig, RawEngineConfig, RawEngineDriver, RawServiceConfig};
use halbridge_engine_api::EngineStatus;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_DISPATCHER_THREAD: &str = "halbridge-dispatcher";
pub const DEFAULT_EVENT_LOOP_THREAD: &str = "halbridge-event-loop";

/// Validated configuration ready for use by the service
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HalConfig {
    pub service: ServiceConfig,
    pub engine: EngineConfig,
}

impl HalConfig {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            service: ServiceConfig::from_raw(raw.service),
            engine: EngineConfig::from_raw(raw.engine),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub log_level: String,
    pub autostart: bool,
    pub dispatcher_thread: String,
    pub event_loop_thread: String,
}

impl ServiceConfig {
    fn from_raw(raw: RawServiceConfig) -> Self {
        Self {
            log_level: raw.log_level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.into()),
            autostart: raw.autostart.unwrap_or(true),
            dispatcher_thread: raw
                .dispatcher_thread
                .unwrap_or_else(|| DEFAULT_DISPATCHER_THREAD.into()),
            event_loop_thread: raw
                .event_loop_thread
                .unwrap_or_else(|| DEFAULT_EVENT_LOOP_THREAD.into()),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_raw(RawServiceConfig::default())
    }
}

/// Engine driver selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineConfig {
    /// In-process simulated engine reporting `init_status` from initialize
    Simulated { init_status: EngineStatus },
    /// Stub vendor function table
    Unsupported,
}

impl EngineConfig {
    fn from_raw(raw: RawEngineConfig) -> Self {
        match raw.driver {
            RawEngineDriver::Simulated => Self::Simulated {
                init_status: raw
                    .init_status
                    .as_deref()
                    .and_then(EngineStatus::from_name)
                    .unwrap_or(EngineStatus::Success),
            },
            RawEngineDriver::Unsupported => Self::Unsupported,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_raw(RawEngineConfig::default())
    }
}
