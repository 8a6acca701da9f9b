//! Error types for the assembly pipeline
//!
//! None of these escalate past the request that produced them: bind
//! failures are recorded per invocation and the assembly continues, spawn
//! refusals reject a single request before anything is instantiated.

use serde::Serialize;
use spawnforge_types::InstanceId;
use thiserror::Error;

/// Failure of a single bind (setup) invocation
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum SetupError {
    /// The bind function was handed a behavior of another type
    #[error("behavior type mismatch: expected {0}")]
    BehaviorMismatch(&'static str),

    /// The configuration could not be viewed as the declared type
    #[error("configuration type mismatch: expected {0}")]
    ConfigMismatch(&'static str),

    /// The behavior declared the configuration type but has no bind operation for it
    #[error("setup method not found for {0}")]
    Unbound(&'static str),

    /// The configuration value was rejected by the behavior
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// Any other failure raised by the behavior's setup
    #[error("{0}")]
    Failed(String),
}

impl SetupError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        SetupError::Invalid(reason.into())
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        SetupError::Failed(reason.into())
    }
}

/// Refusal of a spawn request before any instantiation happened
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    #[error("no actor template assigned to the spawner")]
    MissingTemplate,

    #[error("only one spawner may be active")]
    DuplicateSpawner,

    #[error("no spawner installed")]
    NoSpawner,
}

/// Errors raised by a spawn button click
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ButtonError {
    #[error("spawn button '{0}' has no config")]
    MissingConfig(String),

    #[error("spawn button '{0}' has no spawner")]
    MissingSpawner(String),

    #[error("no spawn button at index {0}")]
    NoSuchButton(usize),

    #[error("spawn refused: {0}")]
    Refused(#[from] SpawnError),
}

/// Scene bookkeeping errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("instance {0} is already registered")]
    Duplicate(InstanceId),

    #[error("instance {0} not found")]
    NotFound(InstanceId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_messages() {
        assert_eq!(
            SetupError::invalid("speed must be positive").to_string(),
            "invalid configuration: speed must be positive"
        );
        assert_eq!(
            SetupError::Unbound("MoveConfig").to_string(),
            "setup method not found for MoveConfig"
        );
    }

    #[test]
    fn test_button_error_from_spawn_error() {
        let err: ButtonError = SpawnError::MissingTemplate.into();
        assert!(matches!(err, ButtonError::Refused(SpawnError::MissingTemplate)));
    }
}
