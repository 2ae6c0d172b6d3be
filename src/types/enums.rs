//! Enumeration types for the access controller
//!
//! This module contains the controller state, the reason attached to every access
//! decision, the audit outcome, and the directory backend selector.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// State of the single access-decision state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AccessState {
    /// Waiting for a badge
    #[default]
    Idle,
    /// A badge is being authorized; no new poll result is accepted
    Processing,
    /// Access was granted and the grant message is on screen
    Granted,
    /// Access was denied and the denial message is on screen
    Denied,
}

impl AccessState {
    /// Whether a transition from `self` to `next` is part of the state machine
    pub fn can_transition_to(self, next: AccessState) -> bool {
        matches!(
            (self, next),
            (AccessState::Idle, AccessState::Processing)
                | (AccessState::Processing, AccessState::Granted)
                | (AccessState::Processing, AccessState::Denied)
                | (AccessState::Processing, AccessState::Idle)
                | (AccessState::Granted, AccessState::Idle)
                | (AccessState::Denied, AccessState::Idle)
                | (AccessState::Idle, AccessState::Idle)
        )
    }
}

impl fmt::Display for AccessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessState::Idle => write!(f, "Idle"),
            AccessState::Processing => write!(f, "Processing"),
            AccessState::Granted => write!(f, "Granted"),
            AccessState::Denied => write!(f, "Denied"),
        }
    }
}

/// Why an access decision came out the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionReason {
    /// Badge matched the configured admin identifier
    AdminBypass,
    /// Directory record lists the configured zone
    ZoneAuthorized,
    /// Directory record exists but does not list the configured zone
    ZoneNotAuthorized,
    /// Badge is absent from the directory
    BadgeUnknown,
    /// Directory could not be reached; the scan is retry-eligible
    DirectoryUnreachable,
}

impl DecisionReason {
    /// Whether this reason grants access
    pub fn is_grant(self) -> bool {
        matches!(self, DecisionReason::AdminBypass | DecisionReason::ZoneAuthorized)
    }
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionReason::AdminBypass => write!(f, "Admin Bypass"),
            DecisionReason::ZoneAuthorized => write!(f, "Zone Authorized"),
            DecisionReason::ZoneNotAuthorized => write!(f, "Zone Not Authorized"),
            DecisionReason::BadgeUnknown => write!(f, "Badge Unknown"),
            DecisionReason::DirectoryUnreachable => write!(f, "Directory Unreachable"),
        }
    }
}

/// Outcome written to the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessOutcome {
    /// Door was opened
    Granted,
    /// Door stayed closed
    Denied,
}

impl AccessOutcome {
    /// Map a boolean grant flag to an outcome
    pub fn from_granted(granted: bool) -> Self {
        if granted {
            AccessOutcome::Granted
        } else {
            AccessOutcome::Denied
        }
    }

    /// Wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            AccessOutcome::Granted => "granted",
            AccessOutcome::Denied => "denied",
        }
    }
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where authorization records come from and audit records go to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryBackend {
    /// Remote Firestore document store over HTTPS
    Firestore,
    /// Local JSON directory file and JSON-lines audit file
    #[default]
    File,
}

impl fmt::Display for DirectoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryBackend::Firestore => write!(f, "firestore"),
            DirectoryBackend::File => write!(f, "file"),
        }
    }
}

impl FromStr for DirectoryBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "firestore" | "remote" => Ok(DirectoryBackend::Firestore),
            "file" | "local" => Ok(DirectoryBackend::File),
            _ => Err(format!("Unknown directory backend: {}", s)),
        }
    }
}
