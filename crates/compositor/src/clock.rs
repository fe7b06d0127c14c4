use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Upper bound on the motion step factor after a stalled tick.
pub const MAX_CATCH_UP: f32 = 4.0;

/// Source of the current instant for selection expiry and tick pacing.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Clock backed by the system monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new(start: Instant) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Converts wall time between simulation ticks into a motion step factor.
///
/// A factor of 1.0 means exactly one tick interval elapsed, so body motion
/// stays tied to time rather than to how many sub-passes a frame renders.
#[derive(Debug, Clone)]
pub struct SceneClock {
    interval: Duration,
    last: Option<Instant>,
}

impl SceneClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Forgets the previous tick so the next one reports 1.0.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn tick(&mut self, now: Instant) -> f32 {
        let factor = match self.last {
            None => 1.0,
            Some(_) if self.interval.is_zero() => 1.0,
            Some(last) => {
                let elapsed = now.saturating_duration_since(last);
                (elapsed.as_secs_f64() / self.interval.as_secs_f64()) as f32
            }
        };
        self.last = Some(now);
        factor.clamp(0.0, MAX_CATCH_UP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let start = Instant::now();
        let clock = ManualClock::new(start);
        let handle = clock.clone();
        handle.advance(Duration::from_millis(40));
        assert_eq!(clock.now(), start + Duration::from_millis(40));
    }

    #[test]
    fn first_tick_is_one_step() {
        let mut scene_clock = SceneClock::new(Duration::from_millis(25));
        assert_eq!(scene_clock.tick(Instant::now()), 1.0);
    }

    #[test]
    fn factor_tracks_elapsed_time() {
        let start = Instant::now();
        let mut scene_clock = SceneClock::new(Duration::from_millis(25));
        scene_clock.tick(start);
        let half = scene_clock.tick(start + Duration::from_micros(12_500));
        assert!((half - 0.5).abs() < 1e-4);
        let one = scene_clock.tick(start + Duration::from_micros(37_500));
        assert!((one - 1.0).abs() < 1e-4);
    }

    #[test]
    fn stalls_are_clamped() {
        let start = Instant::now();
        let mut scene_clock = SceneClock::new(Duration::from_millis(25));
        scene_clock.tick(start);
        assert_eq!(scene_clock.tick(start + Duration::from_secs(5)), MAX_CATCH_UP);
        // Going backwards saturates to zero.
        assert_eq!(scene_clock.tick(start), 0.0);
    }

    #[test]
    fn reset_restarts_pacing() {
        let start = Instant::now();
        let mut scene_clock = SceneClock::new(Duration::from_millis(25));
        scene_clock.tick(start);
        scene_clock.reset();
        assert_eq!(scene_clock.tick(start + Duration::from_secs(5)), 1.0);
    }
}
