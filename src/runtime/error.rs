//! Error types for controller startup
//!
//! Per-decision failures (directory, audit) never reach this type; the controller
//! absorbs them. [`ControllerError`] covers what can stop the process before the
//! control loop starts.

use thiserror::Error;

use crate::types::{ConfigError, ConfigValidationError};

/// Errors that can stop the access controller
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Configuration loaded but is invalid
    #[error("Configuration validation failed: {0}")]
    Validation(#[from] ConfigValidationError),

    /// A backend adapter could not be constructed
    #[error("Backend setup failed: {0}")]
    BackendSetup(String),

    /// Logging could not be initialized
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl ControllerError {
    /// Create a backend setup error
    pub fn backend_setup(msg: impl Into<String>) -> Self {
        Self::BackendSetup(msg.into())
    }

    /// Create a logging setup error
    pub fn logging(msg: impl Into<String>) -> Self {
        Self::Logging(msg.into())
    }

    /// Whether the controller can still start after this error
    ///
    /// Only logging failures are recoverable: the controller runs without logs.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ControllerError::Config(_) => false,
            ControllerError::Validation(_) => false,
            ControllerError::BackendSetup(_) => false,
            ControllerError::Logging(_) => true,
        }
    }

    /// Error category for log output
    pub fn category(&self) -> &'static str {
        match self {
            ControllerError::Config(_) => "Configuration",
            ControllerError::Validation(_) => "Validation",
            ControllerError::BackendSetup(_) => "Backend Setup",
            ControllerError::Logging(_) => "Logging",
        }
    }
}

/// Result type for controller setup operations
pub type ControllerResult<T> = Result<T, ControllerError>;
