use std::time::{Duration, Instant};

/// Trailing-edge debounce for saves.
///
/// The scheduler holds no timer thread: the event loop passes the current
/// instant in and asks whether the save is due. Every `schedule` pushes the
/// deadline back, so a burst of changes closer together than `delay` ends in
/// a single save after the last one.
#[derive(Debug, Clone)]
pub struct SaveScheduler {
    delay: Duration,
    deadline: Option<Instant>,
}

impl SaveScheduler {
    pub fn new(delay: Duration) -> Self {
        SaveScheduler {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm (or re-arm) the deadline at `now + delay`
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Disarm. Returns whether a save was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once per armed deadline, once `now` has reached it
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Time left before the pending save is due (zero if overdue)
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(250);

    #[test]
    fn test_fires_once_after_delay() {
        let t0 = Instant::now();
        let mut s = SaveScheduler::new(DELAY);
        s.schedule(t0);

        assert!(!s.fire_if_due(t0 + Duration::from_millis(249)));
        assert!(s.fire_if_due(t0 + DELAY));
        assert!(!s.fire_if_due(t0 + Duration::from_secs(5)));
        assert!(!s.is_pending());
    }

    #[test]
    fn test_burst_collapses_into_one_fire() {
        let t0 = Instant::now();
        let mut s = SaveScheduler::new(DELAY);
        let mut fires = 0;
        for i in 0..10 {
            let now = t0 + Duration::from_millis(i * 100);
            s.schedule(now);
            if s.fire_if_due(now) {
                fires += 1;
            }
        }
        // Last schedule was at 900ms; nothing fires before 1150ms
        assert!(!s.fire_if_due(t0 + Duration::from_millis(1149)));
        if s.fire_if_due(t0 + Duration::from_millis(1150)) {
            fires += 1;
        }
        assert_eq!(fires, 1);
    }

    #[test]
    fn test_reschedule_pushes_deadline_back() {
        let t0 = Instant::now();
        let mut s = SaveScheduler::new(DELAY);
        s.schedule(t0);
        s.schedule(t0 + Duration::from_millis(200));
        assert!(!s.fire_if_due(t0 + Duration::from_millis(300)));
        assert_eq!(
            s.time_until_due(t0 + Duration::from_millis(300)),
            Some(Duration::from_millis(150))
        );
        assert!(s.fire_if_due(t0 + Duration::from_millis(450)));
    }

    #[test]
    fn test_cancel_disarms() {
        let t0 = Instant::now();
        let mut s = SaveScheduler::new(DELAY);
        assert!(!s.cancel());
        s.schedule(t0);
        assert!(s.cancel());
        assert!(!s.fire_if_due(t0 + Duration::from_secs(1)));
        assert_eq!(s.time_until_due(t0), None);
    }

    #[test]
    fn test_overdue_reports_zero_wait() {
        let t0 = Instant::now();
        let mut s = SaveScheduler::new(DELAY);
        s.schedule(t0);
        assert_eq!(s.time_until_due(t0 + Duration::from_secs(1)), Some(Duration::ZERO));
    }
}
