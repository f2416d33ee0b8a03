//! Error types for halbridge

use thiserror::Error;

/// Core error type for halbridge operations
#[derive(Debug, Error)]
pub enum HalError {
    #[error("Dispatcher is closed")]
    DispatcherClosed,

    #[error("Failed to spawn thread: {0}")]
    ThreadSpawn(#[from] std::io::Error),

    #[error("Engine function table error: {0}")]
    EngineTable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HalError {
    pub fn engine_table(msg: impl Into<String>) -> Self {
        Self::EngineTable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, HalError>;
