//! Clock implementations
//!
//! [`SystemClock`] reads the host clocks. [`ManualClock`] only moves when told to,
//! which makes timer behavior reproducible in tests and replays.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, TimeZone};
use tracing::debug;

use crate::ports::Clock;

/// Epoch seconds below which the wall clock is considered never synchronized
///
/// A board that has not reached a time server boots near the epoch.
pub const SYNCHRONIZED_EPOCH_FLOOR: i64 = 100_000;

/// Host monotonic clock plus local wall time
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a system clock
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_time(&self) -> Option<DateTime<Local>> {
        let now = Local::now();
        if now.timestamp() < SYNCHRONIZED_EPOCH_FLOOR {
            debug!("Wall clock not synchronized");
            return None;
        }
        Some(now)
    }
}

/// Manually advanced clock; clones share the same time
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
    wall_origin: Rc<Cell<Option<DateTime<Local>>>>,
}

impl ManualClock {
    /// Create a clock at offset zero with no synchronized wall time
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
            wall_origin: Rc::new(Cell::new(None)),
        }
    }

    /// Create a clock whose wall time starts at the given local date and time
    pub fn with_wall_time(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        let clock = Self::new();
        clock.wall_origin.set(Local.with_ymd_and_hms(year, month, day, hour, min, sec).single());
        clock
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    /// Move time forward by whole milliseconds
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Time elapsed since creation
    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }

    fn wall_time(&self) -> Option<DateTime<Local>> {
        let origin = self.wall_origin.get()?;
        let offset = chrono::Duration::from_std(self.offset.get()).ok()?;
        Some(origin + offset)
    }
}
