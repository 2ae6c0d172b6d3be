//! Audit record construction
//!
//! One record is built after every completed decision, including the admin path,
//! and handed to the audit logger exactly once.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::access::AccessDecision;
use crate::types::{AccessOutcome, BadgeId};

/// Timestamp written when no wall-clock source was ever synchronized
pub const TIMESTAMP_UNAVAILABLE: &str = "unavailable";

/// Format of the audit timestamp (local time)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One append-only entry describing one access attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Formatted local time or [`TIMESTAMP_UNAVAILABLE`]
    #[serde(rename = "time")]
    pub timestamp: String,
    /// Badge that was presented
    pub badge_id: BadgeId,
    /// Subject name from the decision
    pub subject_name: String,
    /// Granted or denied
    pub outcome: AccessOutcome,
    /// Zone this access point enforces
    pub zone: String,
}

impl AuditRecord {
    /// Build the record for a decision
    pub fn new(
        wall_time: Option<DateTime<Local>>,
        badge: &BadgeId,
        decision: &AccessDecision,
        zone: &str,
    ) -> Self {
        Self {
            timestamp: format_timestamp(wall_time),
            badge_id: badge.clone(),
            subject_name: decision.subject_name.clone(),
            outcome: AccessOutcome::from_granted(decision.granted),
            zone: zone.to_string(),
        }
    }

    /// Flat `(field, value)` pairs in wire order
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("time", self.timestamp.as_str()),
            ("badgeId", self.badge_id.as_str()),
            ("subjectName", self.subject_name.as_str()),
            ("outcome", self.outcome.as_str()),
            ("zone", self.zone.as_str()),
        ]
    }
}

/// Format a wall-clock reading for the audit trail
pub fn format_timestamp(wall_time: Option<DateTime<Local>>) -> String {
    match wall_time {
        Some(time) => time.format(TIMESTAMP_FORMAT).to_string(),
        None => TIMESTAMP_UNAVAILABLE.to_string(),
    }
}
