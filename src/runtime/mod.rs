//! Process-level plumbing: errors, logging and the control loop

pub mod control_loop;
pub mod error;
pub mod logging;

pub use control_loop::ControlLoop;
pub use error::{ControllerError, ControllerResult};
pub use logging::{LoggingConfig, LoggingGuard, DEFAULT_LOG_FILE_PREFIX};
