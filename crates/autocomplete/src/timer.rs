//! Time sources and one-shot timers.
//!
//! The widget never sleeps or spawns: timers are deadlines that the host's
//! event loop checks by calling `Widget::pump`.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// A single cancelable timer carrying a payload.
///
/// Arming replaces whatever was armed before, so at most one deadline is
/// ever live.
#[derive(Debug)]
pub struct Timer<T> {
    armed: Option<(Instant, T)>,
}

impl<T> Timer<T> {
    pub fn new() -> Self {
        Self { armed: None }
    }

    pub fn arm(&mut self, due: Instant, payload: T) {
        self.armed = Some((due, payload));
    }

    /// Returns `true` if a timer was pending.
    pub fn clear(&mut self) -> bool {
        self.armed.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.armed.as_ref().map(|(due, _)| *due)
    }

    /// Take the payload if the deadline has passed.
    pub fn fire(&mut self, now: Instant) -> Option<T> {
        match &self.armed {
            Some((due, _)) if *due <= now => self.armed.take().map(|(_, p)| p),
            _ => None,
        }
    }
}

impl<T> Default for Timer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_fires_once_at_deadline() {
        let clock = ManualClock::new();
        let mut timer = Timer::new();
        timer.arm(clock.now() + Duration::from_millis(10), "q");

        clock.advance_ms(9);
        assert_eq!(timer.fire(clock.now()), None);
        clock.advance_ms(1);
        assert_eq!(timer.fire(clock.now()), Some("q"));
        assert_eq!(timer.fire(clock.now()), None);
    }

    #[test]
    fn rearming_replaces_the_previous_payload() {
        let clock = ManualClock::new();
        let mut timer = Timer::new();
        timer.arm(clock.now(), 1);
        timer.arm(clock.now() + Duration::from_millis(5), 2);
        assert_eq!(timer.fire(clock.now()), None);
        clock.advance_ms(5);
        assert_eq!(timer.fire(clock.now()), Some(2));
    }

    #[test]
    fn clear_reports_whether_anything_was_pending() {
        let mut timer: Timer<()> = Timer::new();
        assert!(!timer.clear());
        timer.arm(Instant::now(), ());
        assert!(timer.clear());
        assert!(!timer.is_armed());
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let a = ManualClock::new();
        let b = a.clone();
        let start = b.now();
        a.advance_ms(250);
        assert_eq!(b.now() - start, Duration::from_millis(250));
    }
}
