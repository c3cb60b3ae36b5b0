//! Session clocks
//!
//! Every time-parameterized animation reads seconds from a `Clock`, so a
//! test can substitute `ManualClock` and step time exactly.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic seconds since the clock was created
pub trait Clock {
    fn now(&self) -> f32;
}

/// Wall-clock time
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Rc<Cell<f32>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, seconds: f32) {
        self.time.set(self.time.get() + seconds.max(0.0));
    }

    pub fn set(&self, seconds: f32) {
        self.time.set(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f32 {
        self.time.get()
    }
}
