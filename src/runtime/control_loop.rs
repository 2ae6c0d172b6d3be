//! Cooperative control loop
//!
//! One thread, one controller. Each iteration calls [`AccessController::tick`]
//! and sleeps for the tick interval. The only blocking calls are the bounded ones
//! inside a tick (network timeouts, feedback pulses).

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::access::{AccessController, ControllerStats};
use crate::types::TimingConfig;

/// Drives an [`AccessController`] until asked to stop
#[derive(Debug, Clone)]
pub struct ControlLoop {
    tick_interval: Duration,
    max_ticks: Option<u64>,
}

impl ControlLoop {
    /// Loop sleeping `tick_interval` between iterations
    pub fn new(tick_interval: Duration) -> Self {
        Self { tick_interval, max_ticks: None }
    }

    /// Loop using the configured tick interval
    pub fn from_timing(timing: &TimingConfig) -> Self {
        Self::new(timing.tick_interval())
    }

    /// Stop after at most `max_ticks` iterations even if the flag is never raised
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    /// Start the controller, tick until `shutdown` is raised, then shut it down
    pub fn run(&self, controller: &mut AccessController, shutdown: &AtomicBool) -> ControllerStats {
        controller.start();
        info!(tick_ms = self.tick_interval.as_millis() as u64, "Control loop running");

        let mut ticks: u64 = 0;
        while !shutdown.load(Ordering::SeqCst) {
            if self.max_ticks.is_some_and(|max| ticks >= max) {
                debug!(ticks, "Tick limit reached");
                break;
            }
            controller.tick();
            ticks += 1;
            if !self.tick_interval.is_zero() {
                thread::sleep(self.tick_interval);
            }
        }

        debug!(ticks, "Control loop exiting");
        controller.shutdown()
    }
}
