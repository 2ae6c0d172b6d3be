//! Badge Access Controller
//!
//! Controller for a single physical access point: a contactless badge reader gates
//! a door based on zone-scoped authorization looked up in a remote directory, with
//! visual and audible feedback and an append-only audit trail.
//!
//! # Overview
//!
//! The heart of the crate is [`AccessController`], a single-flight state machine
//! driven by a cooperative loop. Each tick it
//!
//! - debounces badge reads (a minimum scan interval plus a last-seen badge),
//! - decides grant or deny through a local admin bypass or a directory lookup scoped
//!   to one named zone,
//! - drives the door and feedback signals for bounded durations,
//! - emits exactly one audit record per completed decision.
//!
//! Two independent timers run alongside: the door relocks a fixed time after a grant,
//! and the display returns to the idle prompt a fixed time after the last message.
//!
//! ## Quick Start
//!
//! ```rust
//! use badge_access_controller::adapters::{LocalDirectory, ManualClock};
//! use badge_access_controller::ports::{AuditError, AuditLogger, BadgeReader, DoorActuator, StatusDisplay};
//! use badge_access_controller::*;
//! use std::time::Duration;
//!
//! struct OneBadge(Option<BadgeId>);
//! impl BadgeReader for OneBadge {
//!     fn poll(&mut self) -> Option<BadgeId> { self.0.take() }
//! }
//! struct NoAudit;
//! impl AuditLogger for NoAudit {
//!     fn submit(&self, _: &AuditRecord) -> Result<(), AuditError> { Ok(()) }
//! }
//! struct Quiet;
//! impl DoorActuator for Quiet {
//!     fn unlock(&mut self) {}
//!     fn lock(&mut self) {}
//!     fn set_grant_signal(&mut self, _: bool) {}
//!     fn set_open_indicator(&mut self, _: bool) {}
//!     fn chirp_grant(&mut self) {}
//!     fn pulse_deny(&mut self, _: Duration) {}
//! }
//! impl StatusDisplay for Quiet {
//!     fn show(&mut self, _: &str, _: &str) {}
//! }
//!
//! let config = ControllerConfig {
//!     admin_badge_id: "AA11BB22".to_string(),
//!     zone: "IT".to_string(),
//!     ..Default::default()
//! };
//! let admin = BadgeId::parse("aa11bb22")?;
//!
//! let mut controller = AccessController::new(&config, Peripherals {
//!     clock: Box::new(ManualClock::new()),
//!     reader: Box::new(OneBadge(Some(admin))),
//!     directory: Box::new(LocalDirectory::from_entries(Vec::new())),
//!     audit: Box::new(NoAudit),
//!     door: Box::new(Quiet),
//!     display: Box::new(Quiet),
//! });
//! controller.start();
//! controller.tick();
//!
//! assert_eq!(controller.state(), AccessState::Granted);
//! assert!(controller.is_door_open());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: identifiers, enums and configuration
//! - [`access`]: decision logic, audit records, the controller and its statistics
//! - [`ports`]: traits for every external collaborator
//! - [`adapters`]: clock, console devices, local file backend, Firestore backend
//! - [`runtime`]: error taxonomy, logging setup and the control loop
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌──────────────┐    ┌─────────────┐
//! │   Types     │    │    Access    │    │   Runtime   │
//! │             │    │              │    │             │
//! │ BadgeId     │◄───┤ authorize    │◄───┤ ControlLoop │
//! │ Enums       │    │ Controller   │    │ Logging     │
//! │ Config      │    │ AuditRecord  │    │ Errors      │
//! └─────────────┘    └──────────────┘    └─────────────┘
//!                           │
//!                           ▼
//!                    ┌──────────────┐    ┌─────────────┐
//!                    │    Ports     │◄───┤  Adapters   │
//!                    │   (traits)   │    │             │
//!                    └──────────────┘    └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod access;
pub mod adapters;
pub mod ports;
pub mod runtime;
pub mod types;

// Core types and identifiers
pub use types::{
    // Enums
    AccessOutcome,
    AccessState,
    // Identifiers
    BadgeId,
    BadgeIdError,
    // Configuration
    CliArgs,
    ConfigError,
    ConfigValidationError,
    ControllerConfig,
    DecisionReason,
    DirectoryBackend,
    ScanId,
    TimingConfig,
};

// Decision logic and the controller
pub use access::{
    authorize, AccessController, AccessDecision, AccessPolicy, AuditRecord, AuthorizationRecord,
    ControllerStats, Peripherals, Resolution,
};

// Collaborator traits
pub use ports::{
    AuditError, AuditLogger, BadgeReader, Clock, DirectoryClient, DirectoryError, DoorActuator,
    LookupOutcome, StatusDisplay,
};

// Runtime plumbing
pub use runtime::{ControlLoop, ControllerError, ControllerResult, LoggingConfig};
