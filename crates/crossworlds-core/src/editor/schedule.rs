//! Cancellable periodic tasks advanced by an explicit clock.

use std::time::{Duration, Instant};

/// A repeating task that is either stopped or due at a known instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTask {
    interval: Duration,
    next_due: Option<Instant>,
}

impl PollTask {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Start (or restart) the countdown; the first firing is one interval after `now`
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Returns true when the task is due, and schedules the next firing.
    ///
    /// Missed intervals are not replayed: a late tick fires once.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn test_new_task_is_stopped() {
        let mut task = PollTask::new(SECOND);
        assert!(!task.is_running());
        assert!(!task.fire(Instant::now() + SECOND * 10));
    }

    #[test]
    fn test_fires_after_interval() {
        let t0 = Instant::now();
        let mut task = PollTask::new(SECOND);
        task.start(t0);

        assert!(!task.fire(t0));
        assert!(!task.fire(t0 + SECOND / 2));
        assert!(task.fire(t0 + SECOND));
        assert!(!task.fire(t0 + SECOND + SECOND / 2));
        assert!(task.fire(t0 + SECOND * 2));
    }

    #[test]
    fn test_late_tick_fires_once() {
        let t0 = Instant::now();
        let mut task = PollTask::new(SECOND);
        task.start(t0);

        assert!(task.fire(t0 + SECOND * 5));
        assert!(!task.fire(t0 + SECOND * 5));
        assert_eq!(task.next_due(), Some(t0 + SECOND * 6));
    }

    #[test]
    fn test_stop_cancels() {
        let t0 = Instant::now();
        let mut task = PollTask::new(SECOND);
        task.start(t0);
        task.stop();

        assert!(!task.is_running());
        assert!(!task.fire(t0 + SECOND * 3));
    }
}
