//! Access decisions and the controller that acts on them
//!
//! This module contains the core of the access point:
//!
//! - [`decision`]: admin bypass and zone-scoped directory authorization
//! - [`audit`]: construction of the audit record for each decision
//! - [`controller`]: the single-flight state machine with its door and display timers
//! - [`stats`]: per-run counters

pub mod audit;
pub mod controller;
pub mod decision;
pub mod stats;

pub use audit::{format_timestamp, AuditRecord, TIMESTAMP_FORMAT, TIMESTAMP_UNAVAILABLE};
pub use controller::{messages, AccessController, Peripherals};
pub use decision::{
    authorize, AccessDecision, AccessPolicy, AuthorizationRecord, Resolution, ADMIN_SUBJECT,
    UNKNOWN_SUBJECT,
};
pub use stats::ControllerStats;
