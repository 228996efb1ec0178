use std::time::{Duration, Instant};

pub const NO_RESULTS_MESSAGE: &str = "No data matches the current filters.";

/// A transient advisory that hides itself once its delay has passed.
///
/// Each [`Notice::show`] arms a single deadline; nothing repeats.
#[derive(Debug, Clone)]
pub struct Notice {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Notice {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Make the notice visible until `now + delay`. Showing it again while
    /// visible restarts the countdown.
    pub fn show(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Hide the notice if its deadline has passed. Returns whether it is
    /// still visible.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.deadline.is_some_and(|d| now >= d) {
            self.deadline = None;
        }
        self.deadline.is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left before the notice hides itself.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    pub fn dismiss(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hides_after_the_delay_and_stays_hidden() {
        let start = Instant::now();
        let mut notice = Notice::new(Duration::from_millis(4000));
        assert!(!notice.tick(start));

        notice.show(start);
        assert!(notice.tick(start + Duration::from_millis(3999)));
        assert_eq!(
            notice.remaining(start + Duration::from_millis(3000)),
            Some(Duration::from_millis(1000))
        );
        assert!(!notice.tick(start + Duration::from_millis(4000)));
        assert!(!notice.tick(start + Duration::from_secs(60)));
        assert_eq!(notice.remaining(start), None);
    }

    #[test]
    fn showing_again_restarts_the_countdown() {
        let start = Instant::now();
        let mut notice = Notice::new(Duration::from_secs(4));
        notice.show(start);
        notice.show(start + Duration::from_secs(3));
        assert!(notice.tick(start + Duration::from_secs(5)));
        assert!(!notice.tick(start + Duration::from_secs(7)));
    }

    #[test]
    fn can_be_dismissed_early() {
        let start = Instant::now();
        let mut notice = Notice::new(Duration::from_secs(4));
        notice.show(start);
        notice.dismiss();
        assert!(!notice.is_visible());
    }
}
