//! Per-run controller statistics

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::DecisionReason;

/// Counters accumulated by the controller over one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerStats {
    /// Badge reads that started a processing cycle
    pub scans: u64,
    /// Reads suppressed because the badge was still the last-seen one
    pub duplicate_reads: u64,
    /// Granted decisions (admin bypass included)
    pub granted: u64,
    /// Denied decisions
    pub denied: u64,
    /// Grants via the admin bypass
    pub admin_bypasses: u64,
    /// Denials for badges absent from the directory
    pub unknown_badges: u64,
    /// Scans abandoned because the directory was unreachable
    pub connectivity_failures: u64,
    /// Audit submissions that failed
    pub audit_failures: u64,
    /// Completed door open/close cycles
    pub door_cycles: u64,
    /// Wall time the controller ran for
    pub uptime: Duration,
}

impl ControllerStats {
    /// Count one terminal decision
    pub fn record_decision(&mut self, reason: DecisionReason) {
        if reason.is_grant() {
            self.granted += 1;
        } else {
            self.denied += 1;
        }
        match reason {
            DecisionReason::AdminBypass => self.admin_bypasses += 1,
            DecisionReason::BadgeUnknown => self.unknown_badges += 1,
            _ => {}
        }
    }

    /// Share of terminal decisions that granted access, in percent
    pub fn grant_percentage(&self) -> f64 {
        let decided = self.granted + self.denied;
        if decided == 0 {
            0.0
        } else {
            self.granted as f64 / decided as f64 * 100.0
        }
    }

    /// Plain-text summary printed when the controller stops
    pub fn summary(&self) -> String {
        let mut output = String::new();

        output.push_str("Access Controller Stopped\n");
        output.push_str("=========================\n\n");
        output.push_str(&format!("   Uptime: {:.1} seconds\n", self.uptime.as_secs_f64()));
        output.push_str(&format!(
            "   Scans: {} ({} duplicate reads suppressed)\n",
            self.scans, self.duplicate_reads
        ));
        output.push_str(&format!(
            "   Decisions: {} granted, {} denied ({:.1}% granted)\n",
            self.granted,
            self.denied,
            self.grant_percentage()
        ));
        output.push_str(&format!("   Admin Bypasses: {}\n", self.admin_bypasses));
        output.push_str(&format!("   Unknown Badges: {}\n", self.unknown_badges));
        output.push_str(&format!("   Connectivity Failures: {}\n", self.connectivity_failures));
        output.push_str(&format!("   Audit Failures: {}\n", self.audit_failures));
        output.push_str(&format!("   Door Cycles: {}\n", self.door_cycles));

        output
    }
}
