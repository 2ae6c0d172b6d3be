//! Behavioral tests for the access controller state machine and its timers
//!
//! Time is driven by a manual clock; every test ticks the controller the way the
//! control loop would, in small fixed steps.

mod common;

use std::time::Duration;

use badge_access_controller::access::messages;
use badge_access_controller::adapters::ManualClock;
use badge_access_controller::ports::DirectoryError;
use badge_access_controller::{AccessOutcome, AccessState};
use common::*;

#[test]
fn test_start_locks_door_and_shows_ready() {
    let rig = Rig::new();
    let controller = rig.controller();

    assert_eq!(controller.state(), AccessState::Idle);
    assert!(controller.last_seen().is_none());
    assert!(rig.door.is_locked());
    assert!(rig.display.shows("Ready", "Scan badge"));
}

#[test]
fn test_admin_badge_is_granted_without_lookup() {
    let rig = Rig::new();
    let mut controller = rig.controller();

    rig.reader.present("aa11bb22");
    controller.tick();

    assert_eq!(controller.state(), AccessState::Granted);
    assert!(controller.is_door_open());
    assert!(!rig.door.is_locked());
    assert!(rig.display.shows(messages::ADMIN.0, messages::ADMIN.1));
    assert_eq!(rig.directory.lookups(), 0);

    let records = rig.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].outcome, AccessOutcome::Granted);
    assert_eq!(records[0].subject_name, "Admin");
    assert_eq!(records[0].badge_id.as_str(), "AA11BB22");
    assert_eq!(records[0].zone, "IT");
    assert_eq!(records[0].timestamp, "2024-03-08 09:00:00");
}

#[test]
fn test_admin_badge_works_offline() {
    let rig = Rig::new();
    rig.directory.set_reachable(false);
    let mut controller = rig.controller();

    rig.reader.present(ADMIN);
    controller.tick();

    assert_eq!(controller.state(), AccessState::Granted);
    assert_eq!(rig.audit.records().len(), 1);
    assert_eq!(controller.stats().connectivity_failures, 0);
}

#[test]
fn test_grant_drives_door_and_signals() {
    let rig = Rig::new();
    rig.directory.insert("01020304", "Ada", "Lovelace", &["HR", "IT"]);
    let mut controller = rig.controller();

    rig.reader.present("01020304");
    controller.tick();

    assert_eq!(controller.state(), AccessState::Granted);
    assert!(rig.display.shows("Granted", "Welcome Ada Lovelace"));

    let events = rig.door.events();
    let unlock_at = events.iter().position(|event| *event == DoorEvent::Unlock).unwrap();
    assert_eq!(
        &events[unlock_at..],
        &[
            DoorEvent::Unlock,
            DoorEvent::GrantSignal(true),
            DoorEvent::OpenIndicator(true),
            DoorEvent::Chirp,
        ]
    );

    let records = rig.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].subject_name, "Ada Lovelace");
    assert_eq!(records[0].outcome, AccessOutcome::Granted);
}

#[test]
fn test_unknown_badge_is_denied_and_audited() {
    let rig = Rig::new();
    let mut controller = rig.controller();

    rig.reader.present("DEADBEEF");
    controller.tick();

    assert_eq!(controller.state(), AccessState::Denied);
    assert!(!controller.is_door_open());
    assert_eq!(rig.door.unlock_count(), 0);
    assert!(rig.display.shows("Denied", "Unknown badge"));
    assert_eq!(rig.door.deny_pulses(), vec![Duration::from_millis(700)]);

    let records = rig.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].outcome, AccessOutcome::Denied);
    assert_eq!(records[0].subject_name, "Unknown");
    assert_eq!(controller.stats().unknown_badges, 1);
}

#[test]
fn test_wrong_zone_is_denied() {
    let rig = Rig::new();
    rig.directory.insert("01020304", "Ada", "Lovelace", &["HR"]);
    let mut controller = rig.controller();

    rig.reader.present("01020304");
    controller.tick();

    assert_eq!(controller.state(), AccessState::Denied);
    assert_eq!(rig.door.unlock_count(), 0);
    assert!(rig.display.shows("Denied", "No access"));

    let records = rig.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].outcome, AccessOutcome::Denied);
    assert_eq!(records[0].subject_name, "Ada Lovelace");
}

#[test]
fn test_zone_match_is_exact() {
    let rig = Rig::new();
    rig.directory.insert("01020304", "Ada", "Lovelace", &["it", "IT-Lab", " IT"]);
    let mut controller = rig.controller();

    rig.reader.present("01020304");
    controller.tick();

    assert_eq!(controller.state(), AccessState::Denied);
}

#[test]
fn test_offline_scan_takes_fast_path() {
    let rig = Rig::new();
    rig.directory.insert("01020304", "Ada", "Lovelace", &["IT"]);
    rig.directory.set_reachable(false);
    let mut controller = rig.controller();

    rig.reader.present("01020304");
    controller.tick();

    assert_eq!(controller.state(), AccessState::Idle);
    assert!(rig.display.shows("Error", "No network"));
    assert_eq!(rig.door.deny_pulses(), vec![Duration::from_millis(500)]);
    assert_eq!(rig.door.unlock_count(), 0);
    assert_eq!(rig.directory.lookups(), 0);
    assert_eq!(rig.audit.attempts(), 0);
    assert_eq!(controller.stats().connectivity_failures, 1);
    assert_eq!(controller.stats().granted + controller.stats().denied, 0);
}

#[test]
fn test_offline_scan_is_retried_after_display_reset() {
    let rig = Rig::new();
    rig.directory.insert("01020304", "Ada", "Lovelace", &["IT"]);
    rig.directory.set_reachable(false);
    let mut controller = rig.controller();

    rig.reader.present("01020304");
    controller.tick();
    rig.directory.set_reachable(true);

    // Same badge still in range: suppressed until the display reset clears last-seen
    rig.run_for(&mut controller, 1_990, 10);
    assert_eq!(rig.directory.lookups(), 0);
    assert!(controller.stats().duplicate_reads >= 2);

    rig.run_for(&mut controller, 10, 10);
    assert_eq!(rig.now_ms(), 2_000);
    assert_eq!(rig.directory.lookups(), 1);
    assert_eq!(controller.state(), AccessState::Granted);
    assert_eq!(rig.audit.records().len(), 1);
}

#[test]
fn test_timeout_takes_fast_path() {
    let rig = Rig::new();
    rig.directory.fail_with(DirectoryError::Timeout(Duration::from_secs(5)));
    let mut controller = rig.controller();

    rig.reader.present("01020304");
    controller.tick();

    assert_eq!(controller.state(), AccessState::Idle);
    assert!(rig.display.shows("Error", "No network"));
    assert!(rig.audit.records().is_empty());
}

#[test]
fn test_rejected_lookup_is_denied_as_unknown() {
    let rig = Rig::new();
    rig.directory.fail_with(DirectoryError::Rejected { status: 403 });
    let mut controller = rig.controller();

    rig.reader.present("01020304");
    controller.tick();

    assert_eq!(controller.state(), AccessState::Denied);
    assert!(rig.display.shows("Denied", "Unknown badge"));
    assert_eq!(rig.audit.records()[0].subject_name, "Unknown");
}

#[test]
fn test_held_badge_is_decided_once_per_display_window() {
    let rig = Rig::new();
    rig.directory.insert("01020304", "Ada", "Lovelace", &["IT"]);
    let mut controller = rig.controller();

    rig.reader.present("01020304");
    controller.tick();
    rig.run_for(&mut controller, 1_490, 10);

    assert_eq!(rig.directory.lookups(), 1);
    assert_eq!(rig.audit.records().len(), 1);
    assert_eq!(rig.door.unlock_count(), 1);
    assert_eq!(controller.stats().scans, 1);
}

#[test]
fn test_door_closes_exactly_after_open_duration() {
    let rig = Rig::new();
    let mut controller = rig.controller();

    rig.reader.present(ADMIN);
    controller.tick();
    rig.reader.remove();

    rig.run_for(&mut controller, 4_990, 10);
    assert!(controller.is_door_open());
    assert!(!rig.door.is_locked());
    // Display has long since reset; the door timer is independent of it
    assert_eq!(controller.state(), AccessState::Idle);
    assert!(rig.display.shows("Ready", "Scan badge"));
    assert_eq!(controller.door_time_remaining(), Some(Duration::from_millis(10)));

    rig.run_for(&mut controller, 10, 10);
    assert_eq!(rig.now_ms(), 5_000);
    assert!(!controller.is_door_open());
    assert!(rig.door.is_locked());
    assert_eq!(controller.stats().door_cycles, 1);

    let events = rig.door.events();
    assert_eq!(
        &events[events.len() - 3..],
        &[DoorEvent::Lock, DoorEvent::GrantSignal(false), DoorEvent::OpenIndicator(false)]
    );
}

#[test]
fn test_door_closes_while_denial_is_displayed() {
    let rig = Rig::new();
    rig.directory.insert("01020304", "Ada", "Lovelace", &["HR"]);
    let mut controller = rig.controller();

    rig.reader.present(ADMIN);
    controller.tick();
    rig.reader.remove();

    // Second person is denied just before the door timer expires
    rig.run_for(&mut controller, 4_500, 10);
    rig.reader.present("01020304");
    rig.run_for(&mut controller, 10, 10);
    assert_eq!(controller.state(), AccessState::Denied);

    rig.run_for(&mut controller, 490, 10);
    assert_eq!(rig.now_ms(), 5_000);
    assert!(!controller.is_door_open());
    assert_eq!(controller.state(), AccessState::Denied);
    assert!(rig.display.shows("Denied", "No access"));
}

#[test]
fn test_display_resets_after_message_duration() {
    let rig = Rig::new();
    let mut controller = rig.controller();

    rig.reader.present("DEADBEEF");
    controller.tick();
    rig.reader.remove();

    rig.run_for(&mut controller, 1_490, 10);
    assert_eq!(controller.state(), AccessState::Denied);
    assert!(rig.display.shows("Denied", "Unknown badge"));
    assert!(controller.last_seen().is_some());

    rig.run_for(&mut controller, 10, 10);
    assert_eq!(controller.state(), AccessState::Idle);
    assert!(rig.display.shows("Ready", "Scan badge"));
    assert!(controller.last_seen().is_none());
}

#[test]
fn test_same_badge_is_processed_again_after_reset() {
    let rig = Rig::new();
    let mut controller = rig.controller();

    rig.reader.present("DEADBEEF");
    controller.tick();
    rig.run_for(&mut controller, 2_000, 10);

    assert_eq!(controller.stats().scans, 2);
    assert_eq!(rig.audit.records().len(), 2);
}

#[test]
fn test_scan_interval_gates_polling() {
    let rig = Rig::new();
    let mut controller = rig.controller();

    controller.tick();
    assert_eq!(rig.reader.polls(), 1);

    rig.run_for(&mut controller, 490, 10);
    assert_eq!(rig.reader.polls(), 1);

    rig.run_for(&mut controller, 10, 10);
    assert_eq!(rig.reader.polls(), 2);

    rig.run_for(&mut controller, 1_000, 10);
    assert_eq!(rig.reader.polls(), 4);
}

#[test]
fn test_reader_is_not_polled_outside_idle() {
    let rig = Rig::new();
    let mut controller = rig.controller();

    rig.reader.present(ADMIN);
    controller.tick();
    let polls = rig.reader.polls();

    rig.run_for(&mut controller, 1_000, 10);
    assert_eq!(controller.state(), AccessState::Granted);
    assert_eq!(rig.reader.polls(), polls);
}

#[test]
fn test_slow_lookup_is_not_interrupted_by_display_reset() {
    let rig = Rig::new();
    rig.directory.insert("01020304", "Ada", "Lovelace", &["IT"]);
    rig.directory.set_latency(Duration::from_millis(4_000));
    let mut controller = rig.controller();

    rig.reader.present("01020304");
    controller.tick();

    assert_eq!(rig.now_ms(), 4_000);
    assert_eq!(controller.state(), AccessState::Granted);
    assert!(rig.display.shows("Granted", "Welcome Ada Lovelace"));
    assert_eq!(
        rig.display.frames(),
        vec![
            ("Ready".to_string(), "Scan badge".to_string()),
            ("Granted".to_string(), "Welcome Ada Lovelace".to_string()),
        ]
    );
}

#[test]
fn test_audit_failure_does_not_change_decision() {
    let rig = Rig::new();
    rig.audit.set_failing(true);
    let mut controller = rig.controller();

    rig.reader.present(ADMIN);
    controller.tick();

    assert_eq!(controller.state(), AccessState::Granted);
    assert!(controller.is_door_open());
    assert_eq!(rig.audit.attempts(), 1);
    assert_eq!(controller.stats().audit_failures, 1);

    // Never retried
    rig.run_for(&mut controller, 1_000, 10);
    assert_eq!(rig.audit.attempts(), 1);
}

#[test]
fn test_unsynchronized_clock_uses_sentinel() {
    let rig = Rig::with_clock(ManualClock::new());
    let mut controller = rig.controller();

    rig.reader.present("DEADBEEF");
    controller.tick();

    assert_eq!(rig.audit.records()[0].timestamp, "unavailable");
}

#[test]
fn test_empty_admin_id_disables_bypass() {
    let rig = Rig::new();
    let mut config = test_config();
    config.admin_badge_id = String::new();
    let mut controller = rig.controller_with(&config);

    rig.reader.present(ADMIN);
    controller.tick();

    assert_eq!(controller.state(), AccessState::Denied);
    assert_eq!(rig.directory.lookups(), 1);
}

#[test]
fn test_shutdown_closes_open_door() {
    let rig = Rig::new();
    let mut controller = rig.controller();

    rig.reader.present(ADMIN);
    controller.tick();
    rig.clock.advance_ms(1_200);

    let stats = controller.shutdown();

    assert!(rig.door.is_locked());
    assert!(!controller.is_door_open());
    assert_eq!(stats.door_cycles, 1);
    assert_eq!(stats.granted, 1);
    assert_eq!(stats.admin_bypasses, 1);
    assert_eq!(stats.uptime, Duration::from_millis(1_200));
    assert!(rig.display.shows(messages::OFFLINE.0, messages::OFFLINE.1));
}
