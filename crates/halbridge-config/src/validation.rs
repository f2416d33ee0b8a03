//! Configuration validation

use crate::schema::{RawConfig, RawEngineDriver};
use halbridge_engine_api::EngineStatus;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Service setting '{field}': {message}")]
    ServiceError { field: String, message: String },

    #[error("Unknown engine status '{0}'")]
    UnknownEngineStatus(String),

    #[error("init_status is only valid for the simulated driver")]
    InitStatusWithoutSimulation,
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let service = &config.service;
    for (field, value) in [
        ("dispatcher_thread", &service.dispatcher_thread),
        ("event_loop_thread", &service.event_loop_thread),
        ("log_level", &service.log_level),
    ] {
        if let Some(value) = value
            && value.trim().is_empty()
        {
            errors.push(ValidationError::ServiceError {
                field: field.into(),
                message: "cannot be empty".into(),
            });
        }
    }

    if let Some(name) = &config.engine.init_status {
        if config.engine.driver != RawEngineDriver::Simulated {
            errors.push(ValidationError::InitStatusWithoutSimulation);
        } else if EngineStatus::from_name(name).is_none() {
            errors.push(ValidationError::UnknownEngineStatus(name.clone()));
        }
    }

    errors
}
