use std::time::{Duration, Instant};

use compositor::Scene;

/// Fixed-rate deadline for simulation ticks, driven from the event loop.
#[derive(Debug, Clone)]
pub(crate) struct TickSchedule {
    interval: Duration,
    next: Instant,
}

impl TickSchedule {
    pub(crate) fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next: now + interval,
        }
    }

    /// Returns true when a tick is due and moves the deadline forward. A loop
    /// that fell behind restarts from `now` instead of firing a burst.
    pub(crate) fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        let following = self.next + self.interval;
        self.next = if following <= now {
            now + self.interval
        } else {
            following
        };
        true
    }

    pub(crate) fn next_deadline(&self) -> Instant {
        self.next
    }
}

/// Runs the simulation tick when one is due and returns true when the host
/// should draw. Frames follow ticks, never the display refresh.
pub(crate) fn advance_simulation(
    schedule: &mut TickSchedule,
    scene: &mut Scene,
    now: Instant,
) -> bool {
    if !schedule.poll(now) {
        return false;
    }
    scene.on_simulation_tick();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use compositor::{
        Body, BodyId, Clock, Frustum, ManualClock, PassParams, PickRegion, RenderHost, Viewport,
    };
    use sceneconfig::{SceneConfig, SpeedPolicy};

    const TICK: Duration = Duration::from_millis(25);

    #[test]
    fn fires_once_per_interval() {
        let start = Instant::now();
        let mut schedule = TickSchedule::new(TICK, start);
        assert!(!schedule.poll(start + Duration::from_millis(10)));
        assert!(schedule.poll(start + TICK));
        assert!(!schedule.poll(start + TICK + Duration::from_millis(1)));
        assert_eq!(schedule.next_deadline(), start + TICK * 2);
    }

    #[test]
    fn late_poll_keeps_the_cadence() {
        let start = Instant::now();
        let mut schedule = TickSchedule::new(TICK, start);
        assert!(schedule.poll(start + Duration::from_millis(30)));
        assert_eq!(schedule.next_deadline(), start + TICK * 2);
    }

    #[test]
    fn stalled_loop_does_not_burst() {
        let start = Instant::now();
        let mut schedule = TickSchedule::new(TICK, start);
        let late = start + Duration::from_secs(1);
        assert!(schedule.poll(late));
        assert_eq!(schedule.next_deadline(), late + TICK);
        assert!(!schedule.poll(late));
    }

    struct NullHost;

    impl RenderHost for NullHost {
        fn begin_frame(&mut self, _accumulate: bool) -> Result<()> {
            Ok(())
        }

        fn render_pass(&mut self, _pass: &PassParams, _bodies: &[Body]) -> Result<()> {
            Ok(())
        }

        fn accumulate(&mut self, _weight: f32) -> Result<()> {
            Ok(())
        }

        fn resolve_accumulation(&mut self) -> Result<()> {
            Ok(())
        }
    }

    /// Distance a blur-frozen body covers over `span` when the host wakes
    /// every `wake`, drawing only when told to.
    fn frozen_travel(span: Duration, wake: Duration) -> (u32, f32) {
        let mut config = SceneConfig::default();
        config.render.aa_level = 4;
        config.render.blur_enabled = true;
        config.simulation.speed = SpeedPolicy::Fixed(0.5);

        let start = Instant::now();
        let clock = ManualClock::new(start);
        let mut scene = Scene::new(config, Box::new(clock.clone())).unwrap();
        let viewport = Viewport::new(64, 64);
        let mut pick = |_: &PickRegion, _: &Frustum, _: &[Body]| vec![BodyId(1)];
        assert_eq!(scene.on_click(&mut pick, 32.0, 32.0, &viewport), Some(BodyId(1)));

        let mut schedule = TickSchedule::new(scene.simulation().tick_interval(), start);
        let mut frames = 0;
        let mut elapsed = Duration::ZERO;
        while elapsed < span {
            clock.advance(wake);
            elapsed += wake;
            if advance_simulation(&mut schedule, &mut scene, clock.now()) {
                scene.on_render_frame(&mut NullHost, &viewport).unwrap();
                frames += 1;
            }
        }
        let moved = -scene.body(BodyId(1)).unwrap().position_z();
        (frames, moved)
    }

    #[test]
    fn frozen_body_travel_ignores_wake_frequency() {
        let span = Duration::from_millis(100);
        let (slow_frames, slow_moved) = frozen_travel(span, Duration::from_millis(25));
        let (fast_frames, fast_moved) = frozen_travel(span, Duration::from_millis(5));

        assert_eq!(slow_frames, 4);
        assert_eq!(fast_frames, slow_frames);
        assert!(slow_moved > 0.0);
        assert!((fast_moved - slow_moved).abs() < 1e-4);
    }

    #[test]
    fn no_frame_between_ticks() {
        let config = SceneConfig::default();
        let start = Instant::now();
        let clock = ManualClock::new(start);
        let mut scene = Scene::new(config, Box::new(clock)).unwrap();
        let mut schedule = TickSchedule::new(TICK, start);

        let early = start + Duration::from_millis(10);
        assert!(!advance_simulation(&mut schedule, &mut scene, early));
        assert!(advance_simulation(&mut schedule, &mut scene, start + TICK));
        let between = start + TICK + Duration::from_millis(5);
        assert!(!advance_simulation(&mut schedule, &mut scene, between));
    }
}
