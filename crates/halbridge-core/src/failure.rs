//! Engine status to failure reason translation
//!
//! This is the only place engine-specific status codes are interpreted.

use halbridge_api::{FailureCategory, FailureReason};
use halbridge_engine_api::EngineStatus;

/// Build a failure reason from a category and description
pub fn failure_reason(category: FailureCategory, description: impl Into<String>) -> FailureReason {
    FailureReason::new(category, description)
}

/// Translate an engine status and a base description into a failure reason
///
/// Unmapped statuses collapse into `Unknown` and the description is replaced
/// with the literal `"unknown"`.
pub fn translate_engine_failure(status: EngineStatus, description: &str) -> FailureReason {
    match status {
        EngineStatus::Uninitialized | EngineStatus::NotAvailable => {
            failure_reason(FailureCategory::NotAvailable, description)
        }

        EngineStatus::NotSupported => failure_reason(FailureCategory::NotSupported, description),

        EngineStatus::InvalidArgs | EngineStatus::InvalidRequestId => {
            failure_reason(FailureCategory::InvalidArgs, description)
        }

        EngineStatus::TimedOut => {
            failure_reason(FailureCategory::Unknown, format!("{description}, timed out"))
        }

        EngineStatus::TooManyRequests => failure_reason(
            FailureCategory::Unknown,
            format!("{description}, too many requests"),
        ),

        EngineStatus::OutOfMemory => {
            failure_reason(FailureCategory::Unknown, format!("{description}, out of memory"))
        }

        EngineStatus::None
        | EngineStatus::Unknown
        | EngineStatus::Success
        | EngineStatus::Busy
        | EngineStatus::Other(_) => failure_reason(FailureCategory::Unknown, "unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESC: &str = "Failed to initialize HAL";

    fn check(status: EngineStatus, category: FailureCategory, description: &str) {
        let reason = translate_engine_failure(status, DESC);
        assert_eq!(reason.category, category, "category for {status:?}");
        assert_eq!(reason.description, description, "description for {status:?}");
    }

    #[test]
    fn not_available_group_keeps_description() {
        check(EngineStatus::Uninitialized, FailureCategory::NotAvailable, DESC);
        check(EngineStatus::NotAvailable, FailureCategory::NotAvailable, DESC);
    }

    #[test]
    fn not_supported_keeps_description() {
        check(EngineStatus::NotSupported, FailureCategory::NotSupported, DESC);
    }

    #[test]
    fn invalid_args_group_keeps_description() {
        check(EngineStatus::InvalidArgs, FailureCategory::InvalidArgs, DESC);
        check(EngineStatus::InvalidRequestId, FailureCategory::InvalidArgs, DESC);
    }

    #[test]
    fn suffixed_unknowns() {
        check(
            EngineStatus::TimedOut,
            FailureCategory::Unknown,
            "Failed to initialize HAL, timed out",
        );
        check(
            EngineStatus::TooManyRequests,
            FailureCategory::Unknown,
            "Failed to initialize HAL, too many requests",
        );
        check(
            EngineStatus::OutOfMemory,
            FailureCategory::Unknown,
            "Failed to initialize HAL, out of memory",
        );
    }

    #[test]
    fn everything_else_is_unknown() {
        for status in [
            EngineStatus::None,
            EngineStatus::Unknown,
            EngineStatus::Busy,
            EngineStatus::Success,
            EngineStatus::Other(-77),
        ] {
            check(status, FailureCategory::Unknown, "unknown");
        }
    }
}
