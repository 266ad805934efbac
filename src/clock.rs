//! Wall-clock and blocking-wait source for the session.

use std::time::Duration;

use chrono::{DateTime, Local};

/// Time source used for overlay timestamps and plain waits.
pub trait Clock {
    /// Current local wall-clock time.
    fn now(&self) -> DateTime<Local>;

    /// Block the calling thread for `duration`.
    fn sleep(&mut self, duration: Duration);
}

/// The system clock and `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
