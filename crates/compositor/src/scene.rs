use std::time::Instant;

use rand::prelude::*;
use sceneconfig::{ConfigError, RenderSettings, SceneConfig, SimulationSettings, SpeedPolicy};
use tracing::{debug, info, warn};

use crate::body::{Body, BodyId, Motion, PALETTE};
use crate::clock::{Clock, SceneClock};
use crate::compositor::{composite, FrameError, FramePlan, FrameReport};
use crate::host::RenderHost;
use crate::picking::{resolve_hit, HitTester, PickRegion, PointerEvent};
use crate::projection::{Frustum, Viewport, FAR_PLANE, NEAR_PLANE};
use crate::stats::FrameStats;

/// Random speeds are `k / RANDOM_SPEED_DIVISOR` for `k` in `1..=20`.
const RANDOM_SPEED_DIVISOR: f32 = 40.0;

/// Mutable state shared by the tick, frame, input, and reset entry points.
pub struct Scene {
    settings: RenderSettings,
    baseline: RenderSettings,
    simulation: SimulationSettings,
    bodies: Vec<Body>,
    clock: Box<dyn Clock>,
    scene_clock: SceneClock,
    stats: FrameStats,
    rng: StdRng,
    started_at: Instant,
}

impl Scene {
    pub fn new(config: SceneConfig, clock: Box<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;
        let SceneConfig {
            render, simulation, ..
        } = config;

        let rng = match simulation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let started_at = clock.now();
        let mut scene = Self {
            baseline: render.clone(),
            settings: render,
            scene_clock: SceneClock::new(simulation.tick_interval()),
            simulation,
            bodies: Vec::new(),
            clock,
            stats: FrameStats::new(),
            rng,
            started_at,
        };
        scene.reset();
        Ok(scene)
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn simulation(&self) -> &SimulationSettings {
        &self.simulation
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|body| body.id() == id)
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Replaces the render settings. On error the current settings stay.
    pub fn configure(&mut self, settings: RenderSettings) -> Result<(), ConfigError> {
        settings.validate()?;
        if settings != self.settings {
            info!(
                antialias = settings.aa_level,
                depth_of_field = settings.dof_level,
                motion_blur = settings.blur_enabled,
                fov = settings.fov_degrees,
                debug = settings.debug,
                "render settings changed"
            );
        }
        self.settings = settings;
        Ok(())
    }

    /// Puts every body back at the start with fresh speeds and restores the
    /// startup render settings.
    pub fn reset(&mut self) {
        self.settings = self.baseline.clone();
        self.bodies = self
            .simulation
            .bodies
            .iter()
            .enumerate()
            .map(|(index, layout)| {
                let speed = match self.simulation.speed {
                    SpeedPolicy::Random => {
                        self.rng.gen_range(1..=20u32) as f32 / RANDOM_SPEED_DIVISOR
                    }
                    SpeedPolicy::Fixed(speed) => speed,
                };
                let body = Body::new(BodyId(index as u32 + 1), *layout, index, speed);
                debug!(
                    body = %body.id(),
                    color = PALETTE[body.color_index()].name,
                    speed = body.base_speed(),
                    radius = body.radius(),
                    x_offset = body.x_offset(),
                    "body reset"
                );
                body
            })
            .collect();
        self.scene_clock.reset();
        self.stats.reset();
    }

    fn motion(&self) -> Motion {
        Motion::new(&self.settings, &self.simulation)
    }

    /// Advances every body that is not frozen for motion blur.
    pub fn on_simulation_tick(&mut self) {
        let now = self.clock.now();
        let step = self.scene_clock.tick(now);
        let motion = self.motion();
        let freeze = self.settings.freezes_selected();

        for body in &mut self.bodies {
            body.expire_selection(now, motion.selection_duration);
            if freeze && body.is_selected() {
                continue;
            }
            body.advance(step, &motion, now);
        }
    }

    pub fn plan_frame(&self, viewport: &Viewport) -> Result<FramePlan, ConfigError> {
        FramePlan::build(&self.settings, viewport)
    }

    pub fn on_render_frame<H>(
        &mut self,
        host: &mut H,
        viewport: &Viewport,
    ) -> Result<FrameReport, FrameError>
    where
        H: RenderHost + ?Sized,
    {
        let plan = match self.plan_frame(viewport) {
            Ok(plan) => plan,
            Err(err) => {
                warn!("skipping frame: {err}");
                return Err(err.into());
            }
        };

        let now = self.clock.now();
        let motion = self.motion();
        let report = composite(host, &plan, &mut self.bodies, &motion, now)?;

        if let Some(fps) = self.stats.record(now) {
            if self.settings.debug {
                info!(
                    elapsed_ms = now.saturating_duration_since(self.started_at).as_millis() as u64,
                    fps,
                    antialias = self.settings.aa_level,
                    depth_of_field = self.settings.dof_level,
                    fov = self.settings.fov_degrees,
                    motion_blur = self.settings.blur_enabled,
                    "frame statistics"
                );
            }
        }
        Ok(report)
    }

    /// Selects the body under the pointer position `(x, y)`, given with a
    /// top-left origin.
    pub fn on_click<T>(
        &mut self,
        tester: &mut T,
        x: f32,
        y: f32,
        viewport: &Viewport,
    ) -> Option<BodyId>
    where
        T: HitTester + ?Sized,
    {
        let frustum = Frustum::perspective(
            self.settings.fov_degrees,
            viewport.aspect(),
            NEAR_PLANE,
            FAR_PLANE,
        );
        let region = PickRegion::around(x, y, viewport);
        let pick_frustum = frustum.pick(&region, viewport);
        let hits = tester.hit_test(&region, &pick_frustum, &self.bodies);
        let id = resolve_hit(&hits, &self.bodies)?;

        let now = self.clock.now();
        let boost = self.settings.boost_on_pick;
        if let Some(body) = self.bodies.iter_mut().find(|body| body.id() == id) {
            body.select(now, boost);
            debug!(body = %id, hits = hits.len(), speed = body.base_speed(), "picked body");
        }
        Some(id)
    }

    pub fn on_pointer<T>(
        &mut self,
        event: PointerEvent,
        tester: &mut T,
        viewport: &Viewport,
    ) -> Option<BodyId>
    where
        T: HitTester + ?Sized,
    {
        if !event.is_primary_press() {
            return None;
        }
        self.on_click(tester, event.x, event.y, viewport)
    }

    /// One-line summary for the window title.
    pub fn status_line(&self) -> String {
        let on_off = |flag: bool| if flag { "on" } else { "off" };
        let aa = match self.settings.aa_level {
            0 => "off".to_string(),
            n => format!("{n}x"),
        };
        let dof = match self.settings.dof_level {
            0 => "off".to_string(),
            n => format!("focus {}", n as f32 + sceneconfig::FOCUS_OFFSET),
        };
        format!(
            "{} fps | AA {aa} | DOF {dof} | blur {} | FOV {:.0}",
            self.stats.fps(),
            on_off(self.settings.blur_enabled),
            self.settings.fov_degrees,
        )
    }
}
