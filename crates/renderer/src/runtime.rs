use std::time::{Duration, Instant};

/// Abstraction over where animation time originates from.
pub trait TimeSource {
    /// Time elapsed since the source was created.
    fn elapsed(&self) -> Duration;
}

/// Time source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    /// Creates a system time source initialised to `Instant::now()`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Time source that only moves when told to.
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ManualTimeSource {
    now: Duration,
}

#[cfg(test)]
impl ManualTimeSource {
    pub(crate) fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

#[cfg(test)]
impl TimeSource for ManualTimeSource {
    fn elapsed(&self) -> Duration {
        self.now
    }
}
