//! Animated integer counters for the total/running/failed readouts.
//!
//! A counter walks from the value currently shown to a new target one unit at
//! a time, spreading the walk over a fixed duration. The walk is driven by the
//! caller's clock via [`CounterTransition::advance`], so there is no timer to
//! leak: a new target replaces the old one and continues from whatever value
//! is on screen.

use std::time::{Duration, Instant};

use crate::model::ServiceCounts;

pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(500);

#[derive(Clone, Debug)]
pub struct CounterTransition {
    shown: i64,
    target: i64,
    step_delay: Duration,
    next_step_at: Option<Instant>,
}

impl CounterTransition {
    pub fn new(value: i64) -> Self {
        Self {
            shown: value,
            target: value,
            step_delay: Duration::ZERO,
            next_step_at: None,
        }
    }

    pub fn shown(&self) -> i64 {
        self.shown
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    pub fn is_animating(&self) -> bool {
        self.next_step_at.is_some()
    }

    /// Start walking towards `target`. Equal values start nothing, and a walk
    /// already heading to `target` keeps its schedule.
    pub fn retarget(&mut self, target: i64, duration: Duration, now: Instant) {
        if target == self.target && self.next_step_at.is_some() {
            return;
        }
        self.target = target;
        if target == self.shown {
            self.next_step_at = None;
            return;
        }

        let range = target.abs_diff(self.shown);
        let per_step_ms = (duration.as_millis() as u64 / range).max(1);
        self.step_delay = Duration::from_millis(per_step_ms);
        self.next_step_at = Some(now + self.step_delay);
    }

    /// Apply every step due at `now`. Returns true if the shown value moved.
    pub fn advance(&mut self, now: Instant) -> bool {
        let mut moved = false;
        while let Some(at) = self.next_step_at {
            if now < at {
                break;
            }
            self.shown += if self.target > self.shown { 1 } else { -1 };
            moved = true;
            self.next_step_at = if self.shown == self.target {
                None
            } else {
                Some(at + self.step_delay)
            };
        }
        moved
    }
}

/// The three counters above the service table.
#[derive(Clone, Debug)]
pub struct CounterSet {
    pub total: CounterTransition,
    pub running: CounterTransition,
    pub failed: CounterTransition,
    duration: Duration,
}

impl CounterSet {
    pub fn new(duration: Duration) -> Self {
        Self {
            total: CounterTransition::new(0),
            running: CounterTransition::new(0),
            failed: CounterTransition::new(0),
            duration,
        }
    }

    pub fn retarget(&mut self, counts: ServiceCounts, now: Instant) {
        self.total.retarget(counts.total, self.duration, now);
        self.running.retarget(counts.running, self.duration, now);
        self.failed.retarget(counts.failed, self.duration, now);
    }

    pub fn advance(&mut self, now: Instant) -> bool {
        // Non-short-circuiting: every counter must step
        self.total.advance(now) | self.running.advance(now) | self.failed.advance(now)
    }

    pub fn is_animating(&self) -> bool {
        self.total.is_animating() || self.running.is_animating() || self.failed.is_animating()
    }

    pub fn shown(&self) -> ServiceCounts {
        ServiceCounts {
            total: self.total.shown(),
            running: self.running.shown(),
            failed: self.failed.shown(),
        }
    }
}

impl Default for CounterSet {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSITION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_values_start_nothing() {
        let now = Instant::now();
        let mut c = CounterTransition::new(4);
        c.retarget(4, DEFAULT_TRANSITION, now);
        assert!(!c.is_animating());
        assert!(!c.advance(now + Duration::from_secs(10)));
        assert_eq!(c.shown(), 4);
    }

    #[test]
    fn test_zero_to_three_steps_one_at_a_time() {
        let start = Instant::now();
        let mut c = CounterTransition::new(0);
        c.retarget(3, Duration::from_millis(500), start);
        assert_eq!(c.step_delay(), Duration::from_millis(166));

        let mut seen = vec![c.shown()];
        let mut t = start;
        while c.is_animating() {
            t += Duration::from_millis(1);
            if c.advance(t) {
                seen.push(c.shown());
            }
        }
        assert_eq!(seen, vec![0, 1, 2, 3]);
        assert_eq!(c.shown(), 3);
        assert!(!c.advance(t + Duration::from_secs(5)));
        assert_eq!(c.shown(), 3);
        assert!(t <= start + Duration::from_millis(500));
    }

    #[test]
    fn test_counts_down() {
        let start = Instant::now();
        let mut c = CounterTransition::new(5);
        c.retarget(2, Duration::from_millis(300), start);
        c.advance(start + Duration::from_millis(100));
        assert_eq!(c.shown(), 4);
        c.advance(start + Duration::from_millis(300));
        assert_eq!(c.shown(), 2);
        assert!(!c.is_animating());
    }

    #[test]
    fn test_retarget_mid_flight_continues_from_shown() {
        let start = Instant::now();
        let mut c = CounterTransition::new(0);
        c.retarget(10, Duration::from_millis(500), start);
        c.advance(start + Duration::from_millis(100));
        assert_eq!(c.shown(), 2);

        c.retarget(0, Duration::from_millis(500), start + Duration::from_millis(100));
        assert_eq!(c.step_delay(), Duration::from_millis(250));
        c.advance(start + Duration::from_millis(1000));
        assert_eq!(c.shown(), 0);
        assert!(!c.is_animating());
    }

    #[test]
    fn test_same_target_keeps_schedule() {
        let start = Instant::now();
        let mut c = CounterTransition::new(0);
        c.retarget(1, Duration::from_millis(500), start);

        let mut t = start;
        for _ in 0..5 {
            t += Duration::from_millis(200);
            c.advance(t);
            c.retarget(1, Duration::from_millis(500), t);
        }
        assert_eq!(c.shown(), 1);
        assert!(!c.is_animating());
    }

    #[test]
    fn test_large_jump_still_terminates() {
        let start = Instant::now();
        let mut c = CounterTransition::new(0);
        c.retarget(2000, Duration::from_millis(500), start);
        assert_eq!(c.step_delay(), Duration::from_millis(1));
        c.advance(start + Duration::from_secs(3));
        assert_eq!(c.shown(), 2000);
    }

    #[test]
    fn test_counter_set() {
        let start = Instant::now();
        let mut set = CounterSet::default();
        set.retarget(
            ServiceCounts {
                total: 3,
                running: 2,
                failed: 0,
            },
            start,
        );
        assert!(set.total.is_animating());
        assert!(!set.failed.is_animating());
        set.advance(start + Duration::from_secs(1));
        assert_eq!(
            set.shown(),
            ServiceCounts {
                total: 3,
                running: 2,
                failed: 0
            }
        );
        assert!(!set.is_animating());
    }
}
