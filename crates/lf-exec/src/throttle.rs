//! Time-gated coalescing of progress notifications.

use std::time::{Duration, Instant};

/// Gated relay: an event passes only if at least `min_interval` has elapsed
/// since the last forwarded one (the first always passes). Dropped events
/// are never buffered or replayed; terminal notifications bypass the
/// throttle entirely at the call site.
#[derive(Debug)]
pub struct ProgressThrottle {
    min_interval: Duration,
    last_forwarded: Option<Instant>,
}

impl ProgressThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_forwarded: None,
        }
    }

    /// Decide whether an event arriving at `now` is forwarded.
    pub fn admit(&mut self, now: Instant) -> bool {
        let pass = match self.last_forwarded {
            None => true,
            Some(last) => now.duration_since(last) >= self.min_interval,
        };
        if pass {
            self.last_forwarded = Some(now);
        }
        pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_event_always_passes() {
        let mut throttle = ProgressThrottle::new(Duration::from_millis(100));
        assert!(throttle.admit(Instant::now()));
    }

    #[test]
    fn coalesces_events_inside_the_window() {
        // 10 events 10 ms apart against a 100 ms window: only the first
        // intermediate notification passes.
        let mut throttle = ProgressThrottle::new(Duration::from_millis(100));
        let base = Instant::now();

        let admitted = (0..10)
            .filter(|i| throttle.admit(base + Duration::from_millis(i * 10)))
            .count();
        assert_eq!(admitted, 1);
    }

    #[test]
    fn event_on_the_window_boundary_passes() {
        let mut throttle = ProgressThrottle::new(Duration::from_millis(100));
        let base = Instant::now();
        assert!(throttle.admit(base));
        assert!(!throttle.admit(base + Duration::from_millis(99)));
        assert!(throttle.admit(base + Duration::from_millis(100)));
    }

    #[test]
    fn zero_interval_forwards_everything() {
        let mut throttle = ProgressThrottle::new(Duration::ZERO);
        let base = Instant::now();
        for i in 0..5 {
            assert!(throttle.admit(base + Duration::from_millis(i)));
        }
    }

    proptest! {
        /// Any two forwarded events are at least the window apart.
        #[test]
        fn forwarded_events_respect_the_window(
            deltas in proptest::collection::vec(0u64..50, 1..100),
            window_ms in 1u64..500,
        ) {
            let mut throttle = ProgressThrottle::new(Duration::from_millis(window_ms));
            let base = Instant::now();

            let mut offset = 0u64;
            let mut forwarded = Vec::new();
            for delta in deltas {
                offset += delta;
                if throttle.admit(base + Duration::from_millis(offset)) {
                    forwarded.push(offset);
                }
            }

            prop_assert!(!forwarded.is_empty());
            for pair in forwarded.windows(2) {
                prop_assert!(pair[1] - pair[0] >= window_ms);
            }
        }
    }
}
