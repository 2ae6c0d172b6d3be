//! Tests for the cooperative control loop

mod common;

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use badge_access_controller::runtime::ControlLoop;
use badge_access_controller::types::TimingConfig;
use badge_access_controller::AccessState;
use common::*;

#[test]
fn test_loop_starts_ticks_and_shuts_down() {
    let rig = Rig::new();
    let mut controller = badge_access_controller::AccessController::new(&test_config(), rig.peripherals());
    let shutdown = AtomicBool::new(false);

    rig.reader.present(ADMIN);
    let stats = ControlLoop::new(Duration::ZERO).with_max_ticks(3).run(&mut controller, &shutdown);

    assert_eq!(stats.scans, 1);
    assert_eq!(stats.granted, 1);
    // The door opened during the run and was closed by the shutdown
    assert_eq!(stats.door_cycles, 1);
    assert!(rig.door.is_locked());
    assert_eq!(rig.audit.records().len(), 1);
}

#[test]
fn test_raised_flag_stops_before_first_tick() {
    let rig = Rig::new();
    let mut controller = badge_access_controller::AccessController::new(&test_config(), rig.peripherals());
    let shutdown = AtomicBool::new(true);

    rig.reader.present(ADMIN);
    let stats = ControlLoop::new(Duration::ZERO).run(&mut controller, &shutdown);

    assert_eq!(rig.reader.polls(), 0);
    assert_eq!(stats.scans, 0);
    assert_eq!(controller.state(), AccessState::Idle);
    assert!(rig.door.is_locked());
    assert_eq!(rig.display.frames().first().map(|(line1, _)| line1.as_str()), Some("Ready"));
}

#[test]
fn test_loop_uses_configured_tick_interval() {
    let rig = Rig::new();
    let mut controller = badge_access_controller::AccessController::new(&test_config(), rig.peripherals());
    let shutdown = AtomicBool::new(false);
    let timing = TimingConfig { tick_interval_ms: 1, ..Default::default() };

    let started = std::time::Instant::now();
    ControlLoop::from_timing(&timing).with_max_ticks(5).run(&mut controller, &shutdown);

    assert!(started.elapsed() >= Duration::from_millis(5));
}
