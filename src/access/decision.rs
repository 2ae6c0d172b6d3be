//! Authorization decision
//!
//! This module turns a badge identifier into a grant/deny decision, either through
//! the local admin bypass or through a zone-scoped directory lookup.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ports::{DirectoryClient, LookupOutcome};
use crate::types::{BadgeId, ControllerConfig, DecisionReason};

/// Subject name used whenever the directory has no usable name
pub const UNKNOWN_SUBJECT: &str = "Unknown";

/// Subject name used for the admin bypass
pub const ADMIN_SUBJECT: &str = "Admin";

/// Authorization data for one badge, as returned by the directory
///
/// Records are produced per lookup and never cached between lookups.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthorizationRecord {
    /// Name shown on screen and written to the audit trail
    pub display_name: String,
    /// Zones this badge may enter
    pub authorized_zones: BTreeSet<String>,
}

impl AuthorizationRecord {
    /// Build a record from optional name parts and zone entries
    ///
    /// The display name is `"<given> <family>"` trimmed, or [`UNKNOWN_SUBJECT`]
    /// when nothing is left.
    pub fn from_name_parts<I>(given: Option<&str>, family: Option<&str>, zones: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let joined = format!("{} {}", given.unwrap_or(""), family.unwrap_or(""));
        let trimmed = joined.trim();
        let display_name = if trimmed.is_empty() {
            UNKNOWN_SUBJECT.to_string()
        } else {
            trimmed.to_string()
        };

        Self { display_name, authorized_zones: zones.into_iter().collect() }
    }

    /// Exact, case-sensitive zone membership
    pub fn authorizes(&self, zone: &str) -> bool {
        self.authorized_zones.contains(zone)
    }
}

/// The injected parameters of the decision: who bypasses, and which zone is enforced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    admin_badge_id: String,
    zone: String,
}

impl AccessPolicy {
    /// Create a policy; an empty admin identifier disables the bypass
    pub fn new(admin_badge_id: impl Into<String>, zone: impl Into<String>) -> Self {
        Self { admin_badge_id: admin_badge_id.into(), zone: zone.into() }
    }

    /// Policy described by a controller configuration
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.admin_badge_id.clone(), config.zone.clone())
    }

    /// Zone this access point enforces
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Whether `badge` is the configured admin badge
    pub fn is_admin(&self, badge: &BadgeId) -> bool {
        !self.admin_badge_id.trim().is_empty() && badge.matches_ignore_case(&self.admin_badge_id)
    }
}

/// Grant/deny decision for one scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    /// Whether the door opens
    pub granted: bool,
    /// Why
    pub reason: DecisionReason,
    /// Who the badge belongs to, as far as we know
    pub subject_name: String,
}

impl AccessDecision {
    /// Grant via the local admin bypass
    pub fn admin_bypass() -> Self {
        Self {
            granted: true,
            reason: DecisionReason::AdminBypass,
            subject_name: ADMIN_SUBJECT.to_string(),
        }
    }

    /// Deny because the directory has no record for the badge
    pub fn badge_unknown() -> Self {
        Self {
            granted: false,
            reason: DecisionReason::BadgeUnknown,
            subject_name: UNKNOWN_SUBJECT.to_string(),
        }
    }

    /// Decide from a directory record for the given zone
    pub fn from_record(record: &AuthorizationRecord, zone: &str) -> Self {
        let granted = record.authorizes(zone);
        Self {
            granted,
            reason: if granted {
                DecisionReason::ZoneAuthorized
            } else {
                DecisionReason::ZoneNotAuthorized
            },
            subject_name: record.display_name.clone(),
        }
    }
}

/// Result of resolving a badge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A terminal decision was reached; it is acted on and audited
    Decided(AccessDecision),
    /// The directory could not be asked; nothing is audited and the scan may be retried
    Unreachable {
        /// Diagnostic for the operator log
        detail: String,
    },
}

/// Resolve a badge against the policy, consulting the directory only when needed
///
/// The admin bypass is checked before any network access and works without
/// connectivity. Every other identity needs an explicit zone match.
pub fn authorize(
    badge: &BadgeId,
    policy: &AccessPolicy,
    directory: &dyn DirectoryClient,
) -> Resolution {
    if policy.is_admin(badge) {
        debug!(badge = %badge, "Admin badge detected, granting locally");
        return Resolution::Decided(AccessDecision::admin_bypass());
    }

    if !directory.is_reachable() {
        return Resolution::Unreachable { detail: "no connectivity to directory".to_string() };
    }

    match directory.lookup(badge) {
        Ok(LookupOutcome::Found(record)) => {
            debug!(
                badge = %badge,
                zones = record.authorized_zones.len(),
                zone = policy.zone(),
                "Directory record found, checking zone membership"
            );
            Resolution::Decided(AccessDecision::from_record(&record, policy.zone()))
        }
        Ok(LookupOutcome::NotFound) => Resolution::Decided(AccessDecision::badge_unknown()),
        Ok(LookupOutcome::Malformed { detail }) => {
            warn!(badge = %badge, detail = %detail, "Malformed directory response, denying");
            let empty = AuthorizationRecord::from_name_parts(None, None, Vec::new());
            Resolution::Decided(AccessDecision::from_record(&empty, policy.zone()))
        }
        Err(err) if err.is_connectivity() => Resolution::Unreachable { detail: err.to_string() },
        Err(err) => {
            warn!(badge = %badge, error = %err, "Directory rejected lookup, treating badge as unknown");
            Resolution::Decided(AccessDecision::badge_unknown())
        }
    }
}
