//! The access-decision state machine and its timers
//!
//! [`AccessController`] owns the state, the three timers and the last-seen badge.
//! Nothing else reads or writes them; every mutation goes through [`AccessController::tick`].
//!
//! ```text
//!            new badge, scan interval elapsed
//!   Idle ───────────────────────────────────▶ Processing
//!    ▲  ▲                                      │   │   │
//!    │  └──── directory unreachable ───────────┘   │   │
//!    │                                   granted   │   │ denied
//!    │         display timer             ▼         │   ▼
//!    └──────────────────────────── Granted / Denied
//! ```

use std::time::{Duration, Instant};

use tracing::{debug, info, info_span, trace, warn};

use crate::access::{authorize, AccessDecision, AccessPolicy, AuditRecord, ControllerStats, Resolution};
use crate::ports::{AuditLogger, BadgeReader, Clock, DirectoryClient, DoorActuator, StatusDisplay};
use crate::types::{AccessState, BadgeId, ControllerConfig, DecisionReason, ScanId, TimingConfig};

/// Text rendered on the two display lines for each situation
pub mod messages {
    /// Idle prompt
    pub const READY: (&str, &str) = ("Ready", "Scan badge");
    /// Admin bypass
    pub const ADMIN: (&str, &str) = ("Welcome", "Admin");
    /// First line of a directory grant; the second line greets the subject
    pub const GRANTED: &str = "Granted";
    /// Badge known but not authorized for this zone
    pub const NO_ACCESS: (&str, &str) = ("Denied", "No access");
    /// Badge absent from the directory
    pub const UNKNOWN_BADGE: (&str, &str) = ("Denied", "Unknown badge");
    /// Directory unreachable
    pub const NO_NETWORK: (&str, &str) = ("Error", "No network");
    /// Controller stopped
    pub const OFFLINE: (&str, &str) = ("Offline", "");
}

/// The collaborators the controller drives
pub struct Peripherals {
    /// Monotonic and wall-clock time
    pub clock: Box<dyn Clock>,
    /// Badge reader
    pub reader: Box<dyn BadgeReader>,
    /// Authorization directory
    pub directory: Box<dyn DirectoryClient>,
    /// Audit trail
    pub audit: Box<dyn AuditLogger>,
    /// Door lock and feedback signals
    pub door: Box<dyn DoorActuator>,
    /// Two-line status display
    pub display: Box<dyn StatusDisplay>,
}

impl std::fmt::Debug for Peripherals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Peripherals").finish_non_exhaustive()
    }
}

/// Single-door access controller
#[derive(Debug)]
pub struct AccessController {
    policy: AccessPolicy,
    timing: TimingConfig,
    io: Peripherals,
    state: AccessState,
    last_seen: Option<BadgeId>,
    last_scan_at: Option<Instant>,
    last_display_at: Instant,
    door_opened_at: Option<Instant>,
    started_at: Instant,
    stats: ControllerStats,
}

impl AccessController {
    /// Build a controller from configuration and its collaborators
    ///
    /// Does not touch the hardware; call [`start`](Self::start) next.
    pub fn new(config: &ControllerConfig, io: Peripherals) -> Self {
        let now = io.clock.now();
        Self {
            policy: AccessPolicy::from_config(config),
            timing: config.timing.clone(),
            io,
            state: AccessState::Idle,
            last_seen: None,
            last_scan_at: None,
            last_display_at: now,
            door_opened_at: None,
            started_at: now,
            stats: ControllerStats::default(),
        }
    }

    /// Put the hardware in its resting state and show the idle prompt
    pub fn start(&mut self) {
        self.io.door.lock();
        self.io.door.set_grant_signal(false);
        self.io.door.set_open_indicator(false);
        self.render(messages::READY.0, messages::READY.1);
        info!(zone = self.policy.zone(), "Access controller ready");
    }

    /// Run one loop iteration: at most one badge poll, then both timer checks
    pub fn tick(&mut self) {
        let now = self.io.clock.now();
        self.poll_reader(now);

        let now = self.io.clock.now();
        self.check_door_timer(now);

        let now = self.io.clock.now();
        self.check_display_timer(now);
    }

    /// Close the door if it is still open and return the run's statistics
    pub fn shutdown(&mut self) -> ControllerStats {
        if self.door_opened_at.is_some() {
            self.close_door();
        }
        self.render(messages::OFFLINE.0, messages::OFFLINE.1);
        self.stats.uptime = self.io.clock.now().saturating_duration_since(self.started_at);
        info!("Access controller stopped");
        self.stats.clone()
    }

    /// Current state
    pub fn state(&self) -> AccessState {
        self.state
    }

    /// Badge that currently suppresses re-triggering, if any
    pub fn last_seen(&self) -> Option<&BadgeId> {
        self.last_seen.as_ref()
    }

    /// Whether the door timer is armed
    pub fn is_door_open(&self) -> bool {
        self.door_opened_at.is_some()
    }

    /// Time left before the door locks again, if it is open
    pub fn door_time_remaining(&self) -> Option<Duration> {
        let opened = self.door_opened_at?;
        let elapsed = self.io.clock.now().saturating_duration_since(opened);
        Some(self.timing.door_open().saturating_sub(elapsed))
    }

    /// Counters so far
    pub fn stats(&self) -> &ControllerStats {
        &self.stats
    }

    /// Policy in force
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    fn poll_reader(&mut self, now: Instant) {
        if self.state != AccessState::Idle {
            return;
        }
        if let Some(last) = self.last_scan_at {
            if now.saturating_duration_since(last) < self.timing.scan_interval() {
                return;
            }
        }
        self.last_scan_at = Some(now);

        let Some(badge) = self.io.reader.poll() else {
            return;
        };

        if self.last_seen.as_ref() == Some(&badge) {
            self.stats.duplicate_reads += 1;
            trace!(badge = %badge, "Badge still in range, ignoring");
            return;
        }

        self.last_seen = Some(badge.clone());
        self.process(&badge);
    }

    fn process(&mut self, badge: &BadgeId) {
        let scan_id = ScanId::new();
        let span = info_span!("scan", scan = %scan_id, badge = %badge);
        let _enter = span.enter();

        self.stats.scans += 1;
        self.transition(AccessState::Processing);

        match authorize(badge, &self.policy, &*self.io.directory) {
            Resolution::Decided(decision) => {
                self.stats.record_decision(decision.reason);
                if decision.granted {
                    self.grant(&decision);
                } else {
                    self.deny(&decision);
                }
                self.submit_audit(badge, &decision);
            }
            Resolution::Unreachable { detail } => {
                warn!(
                    reason = %DecisionReason::DirectoryUnreachable,
                    detail = %detail,
                    "Directory unreachable, scan not processed"
                );
                self.stats.connectivity_failures += 1;
                self.render(messages::NO_NETWORK.0, messages::NO_NETWORK.1);
                self.io.door.pulse_deny(self.timing.connectivity_pulse());
                self.transition(AccessState::Idle);
            }
        }
    }

    fn grant(&mut self, decision: &AccessDecision) {
        info!(subject = %decision.subject_name, reason = %decision.reason, "Access granted");
        if decision.reason == DecisionReason::AdminBypass {
            self.render(messages::ADMIN.0, messages::ADMIN.1);
        } else {
            let greeting = format!("Welcome {}", decision.subject_name);
            self.render(messages::GRANTED, &greeting);
        }
        self.open_door();
        self.transition(AccessState::Granted);
    }

    fn deny(&mut self, decision: &AccessDecision) {
        info!(subject = %decision.subject_name, reason = %decision.reason, "Access denied");
        let (line1, line2) = match decision.reason {
            DecisionReason::BadgeUnknown => messages::UNKNOWN_BADGE,
            _ => messages::NO_ACCESS,
        };
        self.render(line1, line2);
        self.io.door.pulse_deny(self.timing.deny_pulse());
        self.transition(AccessState::Denied);
    }

    fn submit_audit(&mut self, badge: &BadgeId, decision: &AccessDecision) {
        let record = AuditRecord::new(self.io.clock.wall_time(), badge, decision, self.policy.zone());
        match self.io.audit.submit(&record) {
            Ok(()) => debug!(outcome = %record.outcome, "Audit record stored"),
            Err(err) => {
                self.stats.audit_failures += 1;
                warn!(error = %err, outcome = %record.outcome, "Audit submission failed, record dropped");
            }
        }
    }

    fn open_door(&mut self) {
        self.io.door.unlock();
        self.door_opened_at = Some(self.io.clock.now());
        self.io.door.set_grant_signal(true);
        self.io.door.set_open_indicator(true);
        self.io.door.chirp_grant();
    }

    fn close_door(&mut self) {
        self.io.door.lock();
        self.io.door.set_grant_signal(false);
        self.io.door.set_open_indicator(false);
        self.door_opened_at = None;
        self.stats.door_cycles += 1;
        info!("Door closed");
    }

    fn check_door_timer(&mut self, now: Instant) {
        if let Some(opened) = self.door_opened_at {
            if now.saturating_duration_since(opened) >= self.timing.door_open() {
                self.close_door();
            }
        }
    }

    fn check_display_timer(&mut self, now: Instant) {
        if self.state == AccessState::Processing {
            return;
        }
        if now.saturating_duration_since(self.last_display_at) >= self.timing.display_message() {
            self.render(messages::READY.0, messages::READY.1);
            self.last_seen = None;
            self.transition(AccessState::Idle);
        }
    }

    fn render(&mut self, line1: &str, line2: &str) {
        self.io.display.show(line1, line2);
        self.last_display_at = self.io.clock.now();
    }

    fn transition(&mut self, next: AccessState) {
        if !self.state.can_transition_to(next) {
            warn!(from = %self.state, to = %next, "Ignoring invalid state transition");
            return;
        }
        if self.state != next {
            debug!(from = %self.state, to = %next, "State transition");
        }
        self.state = next;
    }
}
