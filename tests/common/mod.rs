//! In-memory peripherals shared by the integration tests
//!
//! Every fake hands out cheap clones that share state, so a test keeps one handle
//! while the controller owns another.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use badge_access_controller::adapters::ManualClock;
use badge_access_controller::ports::{
    AuditError, AuditLogger, BadgeReader, DirectoryClient, DirectoryError, DoorActuator,
    LookupOutcome, StatusDisplay,
};
use badge_access_controller::{
    AccessController, AuditRecord, AuthorizationRecord, BadgeId, ControllerConfig, Peripherals,
};

pub const ADMIN: &str = "AA11BB22";
pub const ZONE: &str = "IT";

pub fn badge(raw: &str) -> BadgeId {
    BadgeId::parse(raw).unwrap()
}

pub fn test_config() -> ControllerConfig {
    ControllerConfig {
        admin_badge_id: ADMIN.to_string(),
        zone: ZONE.to_string(),
        ..Default::default()
    }
}

/// Reader that keeps returning whatever badge is held in range
#[derive(Clone, Default)]
pub struct HeldBadgeReader {
    in_range: Rc<RefCell<Option<BadgeId>>>,
    polls: Rc<Cell<usize>>,
}

impl HeldBadgeReader {
    pub fn present(&self, raw: &str) {
        *self.in_range.borrow_mut() = Some(badge(raw));
    }

    pub fn remove(&self) {
        *self.in_range.borrow_mut() = None;
    }

    pub fn polls(&self) -> usize {
        self.polls.get()
    }
}

impl BadgeReader for HeldBadgeReader {
    fn poll(&mut self) -> Option<BadgeId> {
        self.polls.set(self.polls.get() + 1);
        self.in_range.borrow().clone()
    }
}

/// Directory backed by a map, with switchable connectivity and latency
#[derive(Clone)]
pub struct MapDirectory {
    records: Rc<RefCell<HashMap<BadgeId, AuthorizationRecord>>>,
    reachable: Rc<Cell<bool>>,
    forced_error: Rc<RefCell<Option<DirectoryError>>>,
    lookups: Rc<Cell<usize>>,
    latency: Rc<Cell<Duration>>,
    clock: ManualClock,
}

impl MapDirectory {
    pub fn new(clock: &ManualClock) -> Self {
        Self {
            records: Rc::default(),
            reachable: Rc::new(Cell::new(true)),
            forced_error: Rc::default(),
            lookups: Rc::default(),
            latency: Rc::default(),
            clock: clock.clone(),
        }
    }

    pub fn insert(&self, raw: &str, given: &str, family: &str, zones: &[&str]) {
        let record = AuthorizationRecord::from_name_parts(
            Some(given),
            Some(family),
            zones.iter().map(|zone| zone.to_string()),
        );
        self.records.borrow_mut().insert(badge(raw), record);
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.set(reachable);
    }

    pub fn fail_with(&self, error: DirectoryError) {
        *self.forced_error.borrow_mut() = Some(error);
    }

    pub fn set_latency(&self, latency: Duration) {
        self.latency.set(latency);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }
}

impl DirectoryClient for MapDirectory {
    fn is_reachable(&self) -> bool {
        self.reachable.get()
    }

    fn lookup(&self, badge: &BadgeId) -> Result<LookupOutcome, DirectoryError> {
        self.lookups.set(self.lookups.get() + 1);
        self.clock.advance(self.latency.get());
        if let Some(error) = self.forced_error.borrow().clone() {
            return Err(error);
        }
        Ok(match self.records.borrow().get(badge) {
            Some(record) => LookupOutcome::Found(record.clone()),
            None => LookupOutcome::NotFound,
        })
    }
}

/// Audit logger that keeps every submitted record
#[derive(Clone, Default)]
pub struct RecordingAudit {
    records: Rc<RefCell<Vec<AuditRecord>>>,
    failing: Rc<Cell<bool>>,
    attempts: Rc<Cell<usize>>,
}

impl RecordingAudit {
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.borrow().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl AuditLogger for RecordingAudit {
    fn submit(&self, record: &AuditRecord) -> Result<(), AuditError> {
        self.attempts.set(self.attempts.get() + 1);
        if self.failing.get() {
            return Err(AuditError::Rejected { status: 503 });
        }
        self.records.borrow_mut().push(record.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoorEvent {
    Unlock,
    Lock,
    GrantSignal(bool),
    OpenIndicator(bool),
    Chirp,
    DenyPulse(Duration),
}

/// Door that records every signal it is asked to drive
#[derive(Clone, Default)]
pub struct RecordingDoor {
    events: Rc<RefCell<Vec<DoorEvent>>>,
}

impl RecordingDoor {
    pub fn events(&self) -> Vec<DoorEvent> {
        self.events.borrow().clone()
    }

    pub fn unlock_count(&self) -> usize {
        self.events.borrow().iter().filter(|event| **event == DoorEvent::Unlock).count()
    }

    pub fn is_locked(&self) -> bool {
        self.events
            .borrow()
            .iter()
            .rev()
            .find(|event| matches!(event, DoorEvent::Lock | DoorEvent::Unlock))
            .map_or(true, |event| *event == DoorEvent::Lock)
    }

    pub fn deny_pulses(&self) -> Vec<Duration> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                DoorEvent::DenyPulse(duration) => Some(*duration),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: DoorEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl DoorActuator for RecordingDoor {
    fn unlock(&mut self) {
        self.push(DoorEvent::Unlock);
    }

    fn lock(&mut self) {
        self.push(DoorEvent::Lock);
    }

    fn set_grant_signal(&mut self, on: bool) {
        self.push(DoorEvent::GrantSignal(on));
    }

    fn set_open_indicator(&mut self, on: bool) {
        self.push(DoorEvent::OpenIndicator(on));
    }

    fn chirp_grant(&mut self) {
        self.push(DoorEvent::Chirp);
    }

    fn pulse_deny(&mut self, duration: Duration) {
        self.push(DoorEvent::DenyPulse(duration));
    }
}

/// Display that records every frame
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    frames: Rc<RefCell<Vec<(String, String)>>>,
}

impl RecordingDisplay {
    pub fn last(&self) -> Option<(String, String)> {
        self.frames.borrow().last().cloned()
    }

    pub fn shows(&self, line1: &str, line2: &str) -> bool {
        self.last() == Some((line1.to_string(), line2.to_string()))
    }

    pub fn frames(&self) -> Vec<(String, String)> {
        self.frames.borrow().clone()
    }
}

impl StatusDisplay for RecordingDisplay {
    fn show(&mut self, line1: &str, line2: &str) {
        self.frames.borrow_mut().push((line1.to_string(), line2.to_string()));
    }
}

/// One controller's worth of fakes plus the handles to inspect them
pub struct Rig {
    pub clock: ManualClock,
    pub reader: HeldBadgeReader,
    pub directory: MapDirectory,
    pub audit: RecordingAudit,
    pub door: RecordingDoor,
    pub display: RecordingDisplay,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_clock(ManualClock::with_wall_time(2024, 3, 8, 9, 0, 0))
    }

    pub fn with_clock(clock: ManualClock) -> Self {
        Self {
            directory: MapDirectory::new(&clock),
            clock,
            reader: HeldBadgeReader::default(),
            audit: RecordingAudit::default(),
            door: RecordingDoor::default(),
            display: RecordingDisplay::default(),
        }
    }

    pub fn peripherals(&self) -> Peripherals {
        Peripherals {
            clock: Box::new(self.clock.clone()),
            reader: Box::new(self.reader.clone()),
            directory: Box::new(self.directory.clone()),
            audit: Box::new(self.audit.clone()),
            door: Box::new(self.door.clone()),
            display: Box::new(self.display.clone()),
        }
    }

    /// Started controller with the default test configuration
    pub fn controller(&self) -> AccessController {
        self.controller_with(&test_config())
    }

    pub fn controller_with(&self, config: &ControllerConfig) -> AccessController {
        let mut controller = AccessController::new(config, self.peripherals());
        controller.start();
        controller
    }

    /// Tick every `step_ms` until `total_ms` more milliseconds have passed
    pub fn run_for(&self, controller: &mut AccessController, total_ms: u64, step_ms: u64) {
        let mut elapsed = 0;
        while elapsed < total_ms {
            self.clock.advance_ms(step_ms);
            elapsed += step_ms;
            controller.tick();
        }
    }

    pub fn now_ms(&self) -> u128 {
        self.clock.elapsed().as_millis()
    }
}
