use std::time::{Duration, Instant};

/// Tracks when a debounced action should fire after a period of inactivity.
///
/// The debouncer never reads the clock itself: every call takes the current
/// instant, so callers can drive it from a real clock, tokio's paused clock,
/// or a plain counter in tests. At most one deadline is pending at a time;
/// each trigger moves it rather than adding another.
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// The duration to wait after the last event before firing
    delay: Duration,
    /// When the pending action becomes due
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Register that an event occurred, restarting the window
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns true exactly once when the window has elapsed
    pub fn should_execute(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Time left before the action fires, None if nothing is pending
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel any pending action
    pub fn reset(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_quiet_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::from_millis(500);
        debouncer.trigger(start);

        assert!(!debouncer.should_execute(start + Duration::from_millis(499)));
        assert!(debouncer.should_execute(start + Duration::from_millis(500)));
        assert!(!debouncer.should_execute(start + Duration::from_millis(900)));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_trigger_restarts_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::from_millis(500);
        debouncer.trigger(start);
        debouncer.trigger(start + Duration::from_millis(400));

        assert!(!debouncer.should_execute(start + Duration::from_millis(600)));
        assert_eq!(
            debouncer.time_remaining(start + Duration::from_millis(600)),
            Some(Duration::from_millis(300))
        );
        assert!(debouncer.should_execute(start + Duration::from_millis(900)));
    }

    #[test]
    fn test_reset_cancels_pending() {
        let start = Instant::now();
        let mut debouncer = Debouncer::from_millis(500);
        debouncer.trigger(start);
        debouncer.reset();

        assert_eq!(debouncer.time_remaining(start), None);
        assert!(!debouncer.should_execute(start + Duration::from_secs(5)));
    }
}
