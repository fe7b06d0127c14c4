use std::f32::consts::PI;
use std::fmt;
use std::time::{Duration, Instant};

use sceneconfig::{BodyLayout, RenderSettings, SimulationSettings};

/// Speed multiplier for a selected body that is not frozen for motion blur.
pub const ACCELERATED_STEP: f32 = 3.0;

/// Diffuse color of a selected body.
pub const SELECTED_COLOR: [f32; 4] = [0.7, 0.0, 0.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swatch {
    pub name: &'static str,
    pub rgba: [f32; 4],
}

pub const PALETTE: [Swatch; 4] = [
    Swatch {
        name: "Yellow",
        rgba: [0.7, 0.7, 0.0, 1.0],
    },
    Swatch {
        name: "GreenBlue",
        rgba: [0.0, 0.7, 0.7, 1.0],
    },
    Swatch {
        name: "Green",
        rgba: [0.0, 0.7, 0.0, 1.0],
    },
    Swatch {
        name: "Blue",
        rgba: [0.0, 0.0, 0.7, 1.0],
    },
];

/// Name reported by hit testing. Ids start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-advance rules derived from the current settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub travel_limit: f32,
    pub selection_duration: Duration,
    /// Selected bodies move [`ACCELERATED_STEP`] times faster.
    pub accelerate_selected: bool,
}

impl Motion {
    pub fn new(render: &RenderSettings, simulation: &SimulationSettings) -> Self {
        Self {
            travel_limit: simulation.travel_limit,
            selection_duration: render.selection_duration,
            accelerate_selected: !render.freezes_selected(),
        }
    }
}

/// A sphere rolling away from the viewer along the negative Z axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    id: BodyId,
    position_z: f32,
    rotation_deg: f32,
    base_speed: f32,
    default_speed: f32,
    radius: f32,
    x_offset: f32,
    color_index: usize,
    selected_at: Option<Instant>,
    blur_pass_counter: u32,
    laps: u32,
}

impl Body {
    pub fn new(id: BodyId, layout: BodyLayout, color_index: usize, speed: f32) -> Self {
        Self {
            id,
            position_z: 0.0,
            rotation_deg: 0.0,
            base_speed: speed,
            default_speed: speed,
            radius: layout.radius,
            x_offset: layout.x_offset,
            color_index: color_index % PALETTE.len(),
            selected_at: None,
            blur_pass_counter: 0,
            laps: 0,
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn position_z(&self) -> f32 {
        self.position_z
    }

    pub fn rotation_deg(&self) -> f32 {
        self.rotation_deg
    }

    pub fn base_speed(&self) -> f32 {
        self.base_speed
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn x_offset(&self) -> f32 {
        self.x_offset
    }

    pub fn color_index(&self) -> usize {
        self.color_index
    }

    pub fn selected_at(&self) -> Option<Instant> {
        self.selected_at
    }

    pub fn blur_pass_counter(&self) -> u32 {
        self.blur_pass_counter
    }

    /// Number of times the body wrapped back to the start.
    pub fn laps(&self) -> u32 {
        self.laps
    }

    pub fn is_selected(&self) -> bool {
        self.selected_at.is_some()
    }

    pub fn swatch(&self) -> Swatch {
        PALETTE[self.color_index]
    }

    pub fn display_color(&self) -> [f32; 4] {
        if self.is_selected() {
            SELECTED_COLOR
        } else {
            self.swatch().rgba
        }
    }

    /// Marks the body as picked at `now`, optionally doubling its speed.
    pub fn select(&mut self, now: Instant, boost: bool) {
        self.selected_at = Some(now);
        if boost {
            self.base_speed *= 2.0;
        }
    }

    /// Clears an elapsed selection. Returns true when the selection ended.
    pub fn expire_selection(&mut self, now: Instant, duration: Duration) -> bool {
        match self.selected_at {
            Some(at) if now.saturating_duration_since(at) >= duration => {
                self.selected_at = None;
                self.blur_pass_counter = 0;
                self.base_speed = self.default_speed;
                true
            }
            _ => false,
        }
    }

    /// Moves the body `step` speed units down the track.
    pub fn advance(&mut self, step: f32, motion: &Motion, now: Instant) {
        self.expire_selection(now, motion.selection_duration);

        debug_assert!(step >= 0.0, "negative motion step {step}");
        let mut distance = step.max(0.0) * self.base_speed;
        if self.is_selected() && motion.accelerate_selected {
            distance *= ACCELERATED_STEP;
        }

        self.position_z -= distance;
        debug_assert!(
            self.position_z <= 0.0,
            "body {} moved behind the start line: {}",
            self.id,
            self.position_z
        );

        self.rotation_deg = (self.position_z / self.radius) * (180.0 / PI);
        if self.position_z <= -motion.travel_limit {
            self.position_z = 0.0;
            self.rotation_deg = 0.0;
            self.laps = self.laps.saturating_add(1);
        }
    }

    /// Counts one blurred sub-pass; true every `interval` calls.
    pub(crate) fn count_blur_pass(&mut self, interval: u32) -> bool {
        self.blur_pass_counter += 1;
        if self.blur_pass_counter >= interval.max(1) {
            self.blur_pass_counter = 0;
            true
        } else {
            false
        }
    }
}
