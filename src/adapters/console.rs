//! Console peripherals for running the controller on a workstation
//!
//! Badge identifiers are typed on stdin, one per line. The display prints to
//! stderr and the door reports its signals through tracing.

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::ports::{BadgeReader, DoorActuator, StatusDisplay};
use crate::types::BadgeId;

/// Line that stops the controller
pub const QUIT_COMMAND: &str = "quit";

/// Length of each beep of the grant chirp
pub const CHIRP_BEEP: Duration = Duration::from_millis(100);

/// Badge reader fed by lines on standard input
///
/// A background thread reads stdin and forwards parsed badges over a channel, so
/// [`poll`](BadgeReader::poll) never blocks. Each line is delivered once.
/// After `quit` or end of input, the shutdown flag is raised once the queued
/// badges have been polled.
#[derive(Debug)]
pub struct StdinBadgeReader {
    receiver: Receiver<BadgeId>,
    shutdown: Arc<AtomicBool>,
}

impl StdinBadgeReader {
    /// Spawn the stdin reader thread
    pub fn spawn() -> Self {
        let (sender, receiver) = mpsc::channel();
        let shutdown = Arc::new(AtomicBool::new(false));

        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        warn!(error = %err, "Failed to read badge input");
                        break;
                    }
                };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.eq_ignore_ascii_case(QUIT_COMMAND) {
                    break;
                }
                match BadgeId::parse(trimmed) {
                    Ok(badge) => {
                        if sender.send(badge).is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!(input = trimmed, error = %err, "Ignoring unreadable badge"),
                }
            }
            debug!("Badge input closed");
        });

        Self { receiver, shutdown }
    }

    /// Flag raised when input ends; the control loop watches it
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }
}

impl BadgeReader for StdinBadgeReader {
    fn poll(&mut self) -> Option<BadgeId> {
        match self.receiver.try_recv() {
            Ok(badge) => Some(badge),
            Err(TryRecvError::Empty) => None,
            // Input ended and every queued badge has been delivered
            Err(TryRecvError::Disconnected) => {
                self.shutdown.store(true, Ordering::SeqCst);
                None
            }
        }
    }
}

/// Two-line display printed to stderr
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    lines: (String, String),
}

impl ConsoleDisplay {
    /// Create an empty display
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines currently shown
    pub fn lines(&self) -> (&str, &str) {
        (&self.lines.0, &self.lines.1)
    }
}

impl StatusDisplay for ConsoleDisplay {
    fn show(&mut self, line1: &str, line2: &str) {
        if self.lines.0 == line1 && self.lines.1 == line2 {
            return;
        }
        self.lines = (line1.to_string(), line2.to_string());
        eprintln!("[{:<16}]", line1);
        eprintln!("[{:<16}]", line2);
    }
}

/// Door actuator that logs its signals instead of driving GPIO
///
/// Pulses and chirps still block for their duration so the timing matches the
/// hardware.
#[derive(Debug)]
pub struct LoggingDoor {
    locked: bool,
    grant_signal: bool,
    open_indicator: bool,
}

impl LoggingDoor {
    /// Create a door in the locked state
    pub fn new() -> Self {
        Self { locked: true, grant_signal: false, open_indicator: false }
    }

    /// Whether the lock is engaged
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Default for LoggingDoor {
    fn default() -> Self {
        Self::new()
    }
}

impl DoorActuator for LoggingDoor {
    fn unlock(&mut self) {
        self.locked = false;
        info!("Door unlocked");
    }

    fn lock(&mut self) {
        self.locked = true;
        info!("Door locked");
    }

    fn set_grant_signal(&mut self, on: bool) {
        if self.grant_signal != on {
            debug!(on, "Grant signal");
        }
        self.grant_signal = on;
    }

    fn set_open_indicator(&mut self, on: bool) {
        if self.open_indicator != on {
            debug!(on, "Door open indicator");
        }
        self.open_indicator = on;
    }

    fn chirp_grant(&mut self) {
        debug!("Grant chirp");
        thread::sleep(CHIRP_BEEP);
        thread::sleep(CHIRP_BEEP);
    }

    fn pulse_deny(&mut self, duration: Duration) {
        debug!(duration_ms = duration.as_millis() as u64, "Deny pulse");
        thread::sleep(duration);
    }
}
