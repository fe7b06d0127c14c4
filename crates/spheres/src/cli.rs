use std::path::PathBuf;

use clap::Parser;
use sceneconfig::{parse_antialias, parse_speed, RenderSettings, SceneConfig, SpeedPolicy};

#[derive(Parser, Debug)]
#[command(
    name = "spheres",
    author,
    version,
    about = "Rolling spheres with accumulation-buffer anti-aliasing, depth of field, and motion blur"
)]
pub struct Cli {
    /// Settings file; defaults to `settings.toml` in the config directory.
    #[arg(long, value_name = "FILE", env = "SPHERES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Jittered anti-aliasing passes: `off` or 2, 4, 8, 15, 24, 66.
    #[arg(long, value_name = "SAMPLES", value_parser = parse_antialias, env = "SPHERES_ANTIALIAS")]
    pub antialias: Option<u32>,

    /// Depth-of-field level (0 disables); the focal distance is this plus 5.
    #[arg(long, value_name = "LEVEL", env = "SPHERES_DOF")]
    pub dof: Option<u32>,

    /// Smear selected bodies across the accumulation passes.
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true", env = "SPHERES_BLUR")]
    pub blur: Option<bool>,

    /// Vertical field of view in degrees (10-100).
    #[arg(long, value_name = "DEGREES", env = "SPHERES_FOV")]
    pub fov: Option<f32>,

    /// Body speed per tick: `random` or a fixed positive number.
    #[arg(long, value_name = "SPEED", value_parser = parse_speed, env = "SPHERES_SPEED")]
    pub speed: Option<SpeedPolicy>,

    /// Seed for the random speed generator.
    #[arg(long, value_name = "SEED", env = "SPHERES_SEED")]
    pub seed: Option<u64>,

    /// Simulation ticks per second.
    #[arg(long, value_name = "HZ", env = "SPHERES_TICK_RATE")]
    pub tick_rate: Option<u32>,

    /// Double a body's speed when it is picked.
    #[arg(long)]
    pub boost_on_pick: bool,

    /// Log frame statistics once per second.
    #[arg(long)]
    pub debug: bool,

    /// Window size (e.g. `1024x1024`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size, default_value = "1024x1024")]
    pub size: (u32, u32),
}

pub fn parse() -> Cli {
    Cli::parse()
}

impl Cli {
    /// Applies command-line overrides on top of a loaded config.
    pub fn apply(&self, config: &mut SceneConfig) {
        let render: &mut RenderSettings = &mut config.render;
        if let Some(aa) = self.antialias {
            render.aa_level = aa;
        }
        if let Some(dof) = self.dof {
            render.dof_level = dof;
        }
        if let Some(blur) = self.blur {
            render.blur_enabled = blur;
        }
        if let Some(fov) = self.fov {
            render.fov_degrees = fov;
        }
        if self.boost_on_pick {
            render.boost_on_pick = true;
        }
        if self.debug {
            render.debug = true;
        }

        let simulation = &mut config.simulation;
        if let Some(speed) = self.speed {
            simulation.speed = speed;
        }
        if let Some(seed) = self.seed {
            simulation.seed = Some(seed);
        }
        if let Some(rate) = self.tick_rate {
            simulation.tick_rate = rate;
        }
    }
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{}'", w.trim()))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{}'", h.trim()))?;
    if width == 0 || height == 0 {
        return Err("window dimensions must be greater than zero".into());
    }
    Ok((width, height))
}
