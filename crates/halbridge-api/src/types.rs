//! Shared types for the halbridge API

use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-facing failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    Unknown,
    NotSupported,
    InvalidArgs,
    NotAvailable,
}

impl FailureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::NotSupported => "not_supported",
            Self::InvalidArgs => "invalid_args",
            Self::NotAvailable => "not_available",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a command failed, as reported to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    pub category: FailureCategory,
    pub description: String,
}

impl FailureReason {
    pub fn new(category: FailureCategory, description: impl Into<String>) -> Self {
        Self {
            category,
            description: description.into(),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.description)
    }
}

/// Lifecycle state of the coordinated engine
///
/// `Stopped` is both the initial state and the end of every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    #[default]
    Stopped,
    Started,
    Stopping,
}

impl LifecycleState {
    /// Anything short of fully stopped counts as busy.
    pub fn is_started(&self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_stopped_is_not_started() {
        assert!(!LifecycleState::Stopped.is_started());
        assert!(LifecycleState::Started.is_started());
        assert!(LifecycleState::Stopping.is_started());
    }

    #[test]
    fn default_state_is_stopped() {
        assert_eq!(LifecycleState::default(), LifecycleState::Stopped);
    }

    #[test]
    fn failure_reason_display() {
        let reason = FailureReason::new(FailureCategory::NotAvailable, "HAL is stopping");
        assert_eq!(reason.to_string(), "not_available: HAL is stopping");
    }

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&FailureCategory::NotSupported).unwrap();
        assert_eq!(json, "\"not_supported\"");
    }
}
