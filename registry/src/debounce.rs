//! Schedule-or-replace task holder used to coalesce help generation.
//!
//! At most one task is pending. Scheduling again replaces it and pushes the
//! deadline out; the task fires once [`Debouncer::poll`] sees the deadline
//! pass, or immediately on [`Debouncer::flush`]. Time is passed in so that
//! callers (and tests) control the clock.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedules `task` to fire `window` after `now`, replacing a pending one.
    ///
    /// Returns `true` when an earlier task was replaced.
    pub fn schedule(&mut self, now: Instant, task: T) -> bool {
        self.pending.replace((now + self.window, task)).is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Takes the pending task if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, task)| task),
            _ => None,
        }
    }

    /// Takes the pending task regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(_, task)| task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_fires_after_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_secs(1));
        assert!(!debouncer.schedule(start, "write"));

        assert_eq!(debouncer.poll(start + Duration::from_millis(999)), None);
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), Some("write"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_reschedule_replaces_and_extends() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_secs(1));
        debouncer.schedule(start, 1);
        assert!(debouncer.schedule(start + Duration::from_millis(600), 2));

        assert_eq!(debouncer.poll(start + Duration::from_millis(1200)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(1600)), Some(2));
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_flush_fires_immediately() {
        let mut debouncer = Debouncer::new(Duration::from_secs(60));
        debouncer.schedule(Instant::now(), "write");
        assert_eq!(debouncer.flush(), Some("write"));
        assert_eq!(debouncer.flush(), None);
    }
}
