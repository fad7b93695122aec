//! Alert rate limiting
//!
//! Hard drop policy: inside the window every alert is discarded, nothing is
//! queued or merged.

/// Emits at most one alert per `min_interval_millis`
#[derive(Debug, Clone)]
pub struct AlertThrottle {
    min_interval_millis: u64,
    last_emitted_at: Option<u64>,
}

impl AlertThrottle {
    /// Create a throttle that has never emitted
    pub fn new(min_interval_millis: u64) -> Self {
        Self {
            min_interval_millis,
            last_emitted_at: None,
        }
    }

    /// Window length
    pub fn min_interval_millis(&self) -> u64 {
        self.min_interval_millis
    }

    /// Change the window; applies from the next `try_emit`
    pub fn set_min_interval(&mut self, min_interval_millis: u64) {
        self.min_interval_millis = min_interval_millis;
    }

    /// Time of the last successful emit
    pub fn last_emitted_at(&self) -> Option<u64> {
        self.last_emitted_at
    }

    /// Returns true (and records `now`) if an alert may go out at `now`
    ///
    /// The boundary is inclusive: `now - last == interval` is allowed.
    pub fn try_emit(&mut self, now: u64) -> bool {
        let allowed = match self.last_emitted_at {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.min_interval_millis,
        };
        if allowed {
            self.last_emitted_at = Some(now);
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_emit_allowed() {
        let mut throttle = AlertThrottle::new(2000);
        assert!(throttle.try_emit(0));
        assert_eq!(throttle.last_emitted_at(), Some(0));
    }

    #[test]
    fn test_burst_collapses() {
        let mut throttle = AlertThrottle::new(2000);
        assert!(throttle.try_emit(0));
        assert!(!throttle.try_emit(500));
        assert!(throttle.try_emit(2500));
        assert_eq!(throttle.last_emitted_at(), Some(2500));
    }

    #[test]
    fn test_boundary_inclusive() {
        let mut throttle = AlertThrottle::new(1000);
        assert!(throttle.try_emit(1000));
        assert!(!throttle.try_emit(1999));
        assert!(throttle.try_emit(2000));
        assert!(throttle.try_emit(3000));
    }

    #[test]
    fn test_dropped_events_do_not_move_window() {
        let mut throttle = AlertThrottle::new(1000);
        assert!(throttle.try_emit(0));
        for t in (100..1000).step_by(100) {
            assert!(!throttle.try_emit(t));
        }
        assert!(throttle.try_emit(1000));
    }

    #[test]
    fn test_matches_greedy_chain() {
        let times = [0u64, 10, 300, 999, 1000, 1001, 1500, 2100, 2999, 3100, 3100];
        let window = 1000;

        let mut expected = 0;
        let mut last: Option<u64> = None;
        for &t in &times {
            if last.map_or(true, |l| t - l >= window) {
                expected += 1;
                last = Some(t);
            }
        }

        let mut throttle = AlertThrottle::new(window);
        let emitted = times.iter().filter(|&&t| throttle.try_emit(t)).count();
        assert_eq!(emitted, expected);
        assert_eq!(emitted, 4); // 0, 1000, 2100, 3100
    }

    #[test]
    fn test_window_change() {
        let mut throttle = AlertThrottle::new(5000);
        assert!(throttle.try_emit(0));
        assert!(!throttle.try_emit(1000));
        throttle.set_min_interval(500);
        assert!(throttle.try_emit(1000));
    }
}
