//! Collaborator traits at the boundary of the access controller
//!
//! ```text
//!   BadgeReader ──▶ ┌──────────────────┐ ──▶ DoorActuator
//!         Clock ──▶ │ AccessController │ ──▶ StatusDisplay
//! DirectoryClient ◀─│                  │ ──▶ AuditLogger
//!                   └──────────────────┘
//! ```
//!
//! Hardware drivers, the network stack and the remote services implement these
//! traits. The controller only ever talks to them through this module, so the
//! whole decision pipeline runs against in-memory fakes in tests.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::access::{AuditRecord, AuthorizationRecord};
use crate::types::BadgeId;

/// Monotonic tick source and wall-clock time source
pub trait Clock {
    /// Monotonic time used for every controller timer
    fn now(&self) -> Instant;

    /// Local wall-clock time, or `None` when no time source was ever synchronized
    fn wall_time(&self) -> Option<DateTime<Local>>;
}

/// Polled contactless badge reader
pub trait BadgeReader {
    /// Return the badge currently in range, if any
    fn poll(&mut self) -> Option<BadgeId>;
}

/// Result of a directory lookup that reached the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The badge has a directory record
    Found(AuthorizationRecord),
    /// The badge is not in the directory
    NotFound,
    /// The service answered but the body could not be parsed
    Malformed {
        /// Parser diagnostic, for the operator log only
        detail: String,
    },
}

/// Directory failures that never produced an answer about the badge
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// No network path to the directory service
    #[error("Directory service unreachable: {0}")]
    Unreachable(String),

    /// The lookup did not complete within the configured timeout
    #[error("Directory lookup timed out after {0:?}")]
    Timeout(Duration),

    /// The request failed on the wire for another reason
    #[error("Directory transport error: {0}")]
    Transport(String),

    /// The service answered with an error status other than "not found"
    #[error("Directory rejected lookup with status {status}")]
    Rejected {
        /// HTTP status code
        status: u16,
    },
}

impl DirectoryError {
    /// Whether this failure means "could not ask" as opposed to "asked and was refused"
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            DirectoryError::Unreachable(_) | DirectoryError::Timeout(_) | DirectoryError::Transport(_)
        )
    }
}

/// Remote lookup of a badge's authorization record
pub trait DirectoryClient {
    /// Whether there is connectivity to the directory service at all
    fn is_reachable(&self) -> bool;

    /// Look up a badge; implementations must bound the call with a timeout
    fn lookup(&self, badge: &BadgeId) -> Result<LookupOutcome, DirectoryError>;
}

/// Audit submission failures
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Submission did not complete within the configured timeout
    #[error("Audit submission timed out after {0:?}")]
    Timeout(Duration),

    /// The audit service answered with an error status
    #[error("Audit service rejected record with status {status}")]
    Rejected {
        /// HTTP status code
        status: u16,
    },

    /// Transport or I/O failure
    #[error("Audit transport error: {0}")]
    Transport(String),

    /// Local audit file could not be written
    #[error("Audit I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded
    #[error("Audit serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Best-effort append of one audit record
pub trait AuditLogger {
    /// Submit a record once; the caller never retries
    fn submit(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

/// Door lock and feedback signals
pub trait DoorActuator {
    /// Release the door lock
    fn unlock(&mut self);

    /// Engage the door lock
    fn lock(&mut self);

    /// Drive the grant signal (green LED)
    fn set_grant_signal(&mut self, on: bool);

    /// Drive the "door open" indicator
    fn set_open_indicator(&mut self, on: bool);

    /// Short fixed audible pattern played when the door opens
    fn chirp_grant(&mut self);

    /// Fixed-duration deny alert (red LED and buzzer); may block for `duration`
    fn pulse_deny(&mut self, duration: Duration);
}

/// Two-line status display
pub trait StatusDisplay {
    /// Replace both lines
    fn show(&mut self, line1: &str, line2: &str);
}
