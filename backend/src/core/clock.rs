//! Logical time for the enforcement kernel.
//!
//! Every decay window, expiry, and deadline in the invariant catalog
//! (spec §4.4) is a duration measured against "now". The kernel never reads
//! the OS clock directly — it always asks a `Clock`, so decay-window and
//! deadline logic replays identically in tests and in production.

/// A source of the current wall-clock time, expressed in whole seconds.
///
/// # Example
/// ```
/// use itn_core_rs::core::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_000);
/// assert_eq!(clock.now_unix_secs(), 1_000);
/// ```
pub trait Clock: std::fmt::Debug {
    /// Current time as seconds since the Unix epoch.
    fn now_unix_secs(&self) -> i64;
}

/// Deterministic clock for tests and replay: time only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: std::cell::Cell<i64>,
}

impl ManualClock {
    pub fn new(now_unix_secs: i64) -> Self {
        Self {
            now: std::cell::Cell::new(now_unix_secs),
        }
    }

    /// Advance the clock by `secs` seconds.
    pub fn advance(&self, secs: i64) {
        self.now.set(self.now.get() + secs);
    }

    /// Jump the clock to an absolute time.
    pub fn set(&self, now_unix_secs: i64) {
        self.now.set(now_unix_secs);
    }
}

impl Clock for ManualClock {
    fn now_unix_secs(&self) -> i64 {
        self.now.get()
    }
}

/// Production clock backed by `SystemTime`. The core's invariant and kernel
/// logic never construct this directly; it is wired in by the embedding
/// application per spec §6 ("the outer HTTP surface... is not part of the
/// core").
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_secs(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_secs() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(0);
        assert_eq!(clock.now_unix_secs(), 0);
        clock.advance(60);
        assert_eq!(clock.now_unix_secs(), 60);
    }

    #[test]
    fn system_clock_is_plausible() {
        // Sanity bound, not a determinism test: comfortably after this
        // crate's creation and comfortably before any realistic rollover.
        assert!(SystemClock.now_unix_secs() > 1_700_000_000);
    }
}
