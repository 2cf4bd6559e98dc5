//! Quiet-period debouncing for resize-driven re-renders
//!
//! Every poke re-arms the deadline; the action fires only after the quiet
//! period elapses with no further pokes, so a burst of resize events
//! collapses to a single re-render.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Arm (or re-arm) the deadline
    pub fn poke(&mut self) {
        self.deadline = Some(Instant::now() + self.quiet);
    }

    /// True exactly once per armed deadline, after the quiet period
    pub fn fire_due(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn does_not_fire_before_quiet_period() {
        let mut debouncer = Debouncer::new(Duration::from_millis(50));
        debouncer.poke();
        assert!(!debouncer.fire_due());
        assert!(debouncer.is_armed());
    }

    #[test]
    fn fires_once_after_quiet_period() {
        let mut debouncer = Debouncer::new(Duration::from_millis(30));
        debouncer.poke();

        thread::sleep(Duration::from_millis(40));
        assert!(debouncer.fire_due());
        assert!(!debouncer.fire_due());
        assert!(!debouncer.is_armed());
    }

    #[test]
    fn burst_of_pokes_collapses_to_one_firing() {
        let mut debouncer = Debouncer::new(Duration::from_millis(40));

        for _ in 0..5 {
            debouncer.poke();
            thread::sleep(Duration::from_millis(10));
            // Still inside the quiet window: never fires
            assert!(!debouncer.fire_due());
        }

        thread::sleep(Duration::from_millis(50));
        assert!(debouncer.fire_due());
        assert!(!debouncer.fire_due());
    }

    #[test]
    fn unarmed_never_fires() {
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        thread::sleep(Duration::from_millis(20));
        assert!(!debouncer.fire_due());
    }
}
