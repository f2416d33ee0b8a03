//! Engine handle abstraction

use std::fmt;

/// Opaque handle produced by the engine's `initialize` entry point
///
/// The coordinator never interprets it; it is only passed back to the
/// function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EngineHandle(usize);

impl EngineHandle {
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub fn as_raw(&self) -> usize {
        self.0
    }
}

impl fmt::Display for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_round_trips_raw_value() {
        let handle = EngineHandle::from_raw(0xbeef);
        assert_eq!(handle.as_raw(), 0xbeef);
        assert_eq!(handle.to_string(), "0xbeef");
    }
}
