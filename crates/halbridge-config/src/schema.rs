//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Service-level settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Engine driver selection
    #[serde(default)]
    pub engine: RawEngineConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// Default log filter (overridden by RUST_LOG and --log-level)
    pub log_level: Option<String>,

    /// Start the engine as soon as the service is up (default: true)
    pub autostart: Option<bool>,

    /// Name of the serialized dispatcher thread
    pub dispatcher_thread: Option<String>,

    /// Name of the worker thread that blocks in the engine's event loop
    pub event_loop_thread: Option<String>,
}

/// Which engine implementation to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RawEngineDriver {
    /// In-process simulated engine
    #[default]
    Simulated,
    /// Stub function table; every initialization reports not supported
    Unsupported,
}

/// Engine section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawEngineConfig {
    #[serde(default)]
    pub driver: RawEngineDriver,

    /// Status the simulated engine reports from initialize (snake_case name)
    pub init_status: Option<String>,
}
