//! Lifecycle events delivered to observers

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{API_VERSION, FailureReason};

/// Event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub api_version: u32,
    pub timestamp: DateTime<Local>,
    pub payload: LifecycleEvent,
}

impl Event {
    pub fn new(payload: LifecycleEvent) -> Self {
        Self {
            api_version: API_VERSION,
            timestamp: Local::now(),
            payload,
        }
    }
}

/// All lifecycle notifications broadcast by the coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// Engine is running (or was already running)
    Started,

    /// A start request was refused or failed
    StartFailed { reason: FailureReason },

    /// Engine is fully stopped
    Stopped,
}
