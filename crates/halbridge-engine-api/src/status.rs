//! Engine status codes

use std::fmt;

/// Status returned by legacy engine calls
///
/// Mirrors the engine's raw integer codes. `None` shares the raw value of
/// `Success` and is only produced explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineStatus {
    Success,
    None,
    Unknown,
    Uninitialized,
    NotSupported,
    NotAvailable,
    InvalidArgs,
    InvalidRequestId,
    TimedOut,
    TooManyRequests,
    OutOfMemory,
    Busy,
    Other(i32),
}

impl EngineStatus {
    /// Decode a raw status code from the function table
    pub fn from_raw(code: i32) -> Self {
        match code {
            0 => Self::Success,
            -1 => Self::Unknown,
            -2 => Self::Uninitialized,
            -3 => Self::NotSupported,
            -4 => Self::NotAvailable,
            -5 => Self::InvalidArgs,
            -6 => Self::InvalidRequestId,
            -7 => Self::TimedOut,
            -8 => Self::TooManyRequests,
            -9 => Self::OutOfMemory,
            -10 => Self::Busy,
            other => Self::Other(other),
        }
    }

    pub fn as_raw(&self) -> i32 {
        match self {
            Self::Success | Self::None => 0,
            Self::Unknown => -1,
            Self::Uninitialized => -2,
            Self::NotSupported => -3,
            Self::NotAvailable => -4,
            Self::InvalidArgs => -5,
            Self::InvalidRequestId => -6,
            Self::TimedOut => -7,
            Self::TooManyRequests => -8,
            Self::OutOfMemory => -9,
            Self::Busy => -10,
            Self::Other(code) => *code,
        }
    }

    /// Parse a snake_case status name, as used in configuration files
    pub fn from_name(name: &str) -> Option<Self> {
        let status = match name {
            "success" => Self::Success,
            "none" => Self::None,
            "unknown" => Self::Unknown,
            "uninitialized" => Self::Uninitialized,
            "not_supported" => Self::NotSupported,
            "not_available" => Self::NotAvailable,
            "invalid_args" => Self::InvalidArgs,
            "invalid_request_id" => Self::InvalidRequestId,
            "timed_out" => Self::TimedOut,
            "too_many_requests" => Self::TooManyRequests,
            "out_of_memory" => Self::OutOfMemory,
            "busy" => Self::Busy,
            _ => return Option::None,
        };
        Some(status)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(code) => write!(f, "other({code})"),
            status => write!(f, "{:?}", status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_codes_decode() {
        assert_eq!(EngineStatus::from_raw(0), EngineStatus::Success);
        assert_eq!(EngineStatus::from_raw(-3), EngineStatus::NotSupported);
        assert_eq!(EngineStatus::from_raw(-10), EngineStatus::Busy);
        assert_eq!(EngineStatus::from_raw(-42), EngineStatus::Other(-42));
    }

    #[test]
    fn none_encodes_as_success_code() {
        assert_eq!(EngineStatus::None.as_raw(), 0);
        assert!(!EngineStatus::None.is_success());
    }

    #[test]
    fn names_parse() {
        assert_eq!(EngineStatus::from_name("timed_out"), Some(EngineStatus::TimedOut));
        assert_eq!(EngineStatus::from_name("success"), Some(EngineStatus::Success));
        assert_eq!(EngineStatus::from_name("bogus"), None);
    }
}
