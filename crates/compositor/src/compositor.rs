//! Multi-pass frame composition.
//!
//! A frame is either one direct pass or `N` jittered passes blended into an
//! accumulation target at weight `1/N`. Anti-aliasing jitters the frustum by
//! sub-pixel offsets, depth of field jitters the eye, and motion blur steps
//! selected bodies between passes so their trail lands in the blend.

use std::time::Instant;

use sceneconfig::{ConfigError, RenderSettings};
use tracing::trace;

use crate::body::{Body, Motion};
use crate::host::RenderHost;
use crate::jitter::{self, JitterPoint, DOF_SAMPLES};
use crate::projection::{Frustum, PassView, Viewport, FAR_PLANE, NEAR_PLANE};

/// Fraction of a jitter offset applied to the eye for depth of field.
pub const EYE_JITTER_SCALE: f32 = 0.33;

/// Passes between blur steps when only depth of field is active.
pub const DOF_PASS_INTERVAL: u32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("render host failed: {0:#}")]
    Host(anyhow::Error),
}

/// How selected bodies move between accumulation passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlurStep {
    /// Advance by this many speed units on every pass.
    EveryPass(f32),
    /// Advance by one speed unit every `n` passes.
    Interval(u32),
}

impl BlurStep {
    /// `None` unless selected bodies are frozen out of the simulation tick.
    pub fn for_settings(settings: &RenderSettings) -> Option<Self> {
        if !settings.freezes_selected() {
            return None;
        }
        let step = match settings.aa_level {
            0 => BlurStep::Interval(DOF_PASS_INTERVAL),
            2 => BlurStep::EveryPass(2.0),
            4 => BlurStep::EveryPass(1.0),
            aa => BlurStep::Interval(aa.div_ceil(4)),
        };
        Some(step)
    }

    fn apply(self, body: &mut Body, motion: &Motion, now: Instant) -> bool {
        match self {
            BlurStep::EveryPass(units) => {
                body.advance(units, motion, now);
                true
            }
            BlurStep::Interval(passes) => {
                if body.count_blur_pass(passes) {
                    body.advance(1.0, motion, now);
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Everything the host needs to draw one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassParams {
    pub index: u32,
    pub weight: f32,
    pub pixel_jitter: JitterPoint,
    pub eye_jitter: JitterPoint,
    pub focus: f32,
    pub view: PassView,
}

/// Pass schedule for one frame, derived from the render settings.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub passes: Vec<PassParams>,
    pub accumulate: bool,
    pub blur_step: Option<BlurStep>,
}

impl FramePlan {
    pub fn build(settings: &RenderSettings, viewport: &Viewport) -> Result<Self, ConfigError> {
        let frustum = Frustum::perspective(
            settings.fov_degrees,
            viewport.aspect(),
            NEAR_PLANE,
            FAR_PLANE,
        );

        if !settings.multisampled() {
            return Ok(Self {
                passes: vec![PassParams {
                    index: 0,
                    weight: 1.0,
                    pixel_jitter: JitterPoint::ZERO,
                    eye_jitter: JitterPoint::ZERO,
                    focus: settings.focus(),
                    view: PassView::centered(frustum),
                }],
                accumulate: false,
                blur_step: None,
            });
        }

        let antialias = settings.aa_level > 0;
        let depth_of_field = settings.dof_level > 0;
        let table = if antialias {
            jitter::lookup(settings.aa_level)?
        } else {
            jitter::lookup(DOF_SAMPLES)?
        };

        let focus = settings.focus();
        let weight = 1.0 / table.len() as f32;
        let passes = table
            .iter()
            .enumerate()
            .map(|(index, point)| {
                let pixel_jitter = if antialias { *point } else { JitterPoint::ZERO };
                let eye_jitter = if depth_of_field {
                    point.scaled(EYE_JITTER_SCALE)
                } else {
                    JitterPoint::ZERO
                };
                PassParams {
                    index: index as u32,
                    weight,
                    pixel_jitter,
                    eye_jitter,
                    focus,
                    view: frustum.jittered(pixel_jitter, eye_jitter, focus, viewport),
                }
            })
            .collect();

        Ok(Self {
            passes,
            accumulate: true,
            blur_step: BlurStep::for_settings(settings),
        })
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }
}

/// What a composited frame did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub passes: u32,
    pub accumulated: bool,
    /// Number of per-pass body advances applied for motion blur.
    pub blur_steps: u32,
}

/// Renders `plan` through `host`, stepping selected bodies between passes
/// when the plan blurs them.
pub fn composite<H>(
    host: &mut H,
    plan: &FramePlan,
    bodies: &mut [Body],
    motion: &Motion,
    now: Instant,
) -> Result<FrameReport, FrameError>
where
    H: RenderHost + ?Sized,
{
    debug_assert!(!plan.passes.is_empty(), "frame plan without passes");
    trace!(
        passes = plan.pass_count(),
        accumulate = plan.accumulate,
        blur = ?plan.blur_step,
        "compositing frame"
    );

    if !plan.accumulate {
        host.begin_frame(false).map_err(FrameError::Host)?;
        for pass in &plan.passes {
            host.render_pass(pass, bodies).map_err(FrameError::Host)?;
        }
        return Ok(FrameReport {
            passes: plan.passes.len() as u32,
            accumulated: false,
            blur_steps: 0,
        });
    }

    host.begin_frame(true).map_err(FrameError::Host)?;
    let mut blur_steps = 0;
    for pass in &plan.passes {
        if let Some(step) = plan.blur_step {
            for body in bodies.iter_mut() {
                body.expire_selection(now, motion.selection_duration);
                if body.is_selected() && step.apply(body, motion, now) {
                    blur_steps += 1;
                }
            }
        }
        host.render_pass(pass, bodies).map_err(FrameError::Host)?;
        host.accumulate(pass.weight).map_err(FrameError::Host)?;
    }
    host.resolve_accumulation().map_err(FrameError::Host)?;

    Ok(FrameReport {
        passes: plan.passes.len() as u32,
        accumulated: true,
        blur_steps,
    })
}
