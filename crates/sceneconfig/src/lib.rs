use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Jitter table sizes the compositor knows how to sample.
pub const SUPPORTED_SAMPLE_COUNTS: [u32; 6] = [2, 4, 8, 15, 24, 66];

/// Inclusive field-of-view range accepted from config files and key bindings.
pub const FOV_MIN_DEGREES: f32 = 10.0;
pub const FOV_MAX_DEGREES: f32 = 100.0;

/// Offset added to the depth-of-field level to obtain the focal distance.
pub const FOCUS_OFFSET: f32 = 5.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read configuration at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unsupported anti-alias sample count {0}; supported values are 2, 4, 8, 15, 24, or 66")]
    UnsupportedSampleCount(u32),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Feature flags consumed by the compositor on every frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    /// 0 disables anti-aliasing, otherwise one of [`SUPPORTED_SAMPLE_COUNTS`].
    #[serde(rename = "antialias", deserialize_with = "deserialize_antialias")]
    pub aa_level: u32,
    /// 0 disables depth of field, otherwise a focus distance proxy.
    #[serde(rename = "depth_of_field")]
    pub dof_level: u32,
    #[serde(rename = "motion_blur")]
    pub blur_enabled: bool,
    #[serde(rename = "fov")]
    pub fov_degrees: f32,
    /// How long a picked body stays selected.
    #[serde(deserialize_with = "deserialize_duration")]
    pub selection_duration: Duration,
    /// Double the speed of a body at the moment it is picked.
    pub boost_on_pick: bool,
    /// Emit the once-per-second settings dump.
    pub debug: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            aa_level: 0,
            dof_level: 0,
            blur_enabled: false,
            fov_degrees: 50.0,
            selection_duration: Duration::from_millis(500),
            boost_on_pick: false,
            debug: false,
        }
    }
}

impl RenderSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_sample_count(self.aa_level)?;

        if !self.fov_degrees.is_finite()
            || !(FOV_MIN_DEGREES..=FOV_MAX_DEGREES).contains(&self.fov_degrees)
        {
            return Err(ConfigError::Invalid(format!(
                "fov must be between {FOV_MIN_DEGREES} and {FOV_MAX_DEGREES} degrees, got {}",
                self.fov_degrees
            )));
        }

        if self.selection_duration.is_zero() {
            return Err(ConfigError::Invalid(
                "selection_duration must be greater than zero".into(),
            ));
        }

        Ok(())
    }

    /// True when the frame needs more than one jittered sample.
    pub fn multisampled(&self) -> bool {
        self.aa_level > 0 || self.dof_level > 0
    }

    /// Selected bodies stop moving with the simulation tick and are stepped
    /// inside the compositor instead.
    pub fn freezes_selected(&self) -> bool {
        self.blur_enabled && self.multisampled()
    }

    /// Distance from the eye to the plane in focus.
    pub fn focus(&self) -> f32 {
        if self.dof_level > 0 {
            self.dof_level as f32 + FOCUS_OFFSET
        } else {
            1.0
        }
    }
}

/// Initial speed assigned to every body on reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedPolicy {
    /// `k / 40` distance units per tick with `k` drawn from `1..=20`.
    Random,
    /// The same speed for every body.
    Fixed(f32),
}

impl Default for SpeedPolicy {
    fn default() -> Self {
        Self::Random
    }
}

impl fmt::Display for SpeedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedPolicy::Random => f.write_str("random"),
            SpeedPolicy::Fixed(speed) => write!(f, "{speed}"),
        }
    }
}

impl<'de> Deserialize<'de> for SpeedPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Str(String),
            Num(f64),
        }

        match Helper::deserialize(deserializer)? {
            Helper::Str(raw) => parse_speed(&raw).map_err(de::Error::custom),
            Helper::Num(value) => parse_speed(&value.to_string()).map_err(de::Error::custom),
        }
    }
}

/// Placement of one rolling body.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BodyLayout {
    pub x_offset: f32,
    #[serde(default = "default_radius")]
    pub radius: f32,
}

fn default_radius() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSettings {
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Bodies wrap back to the start once they travel past this distance.
    pub travel_limit: f32,
    pub speed: SpeedPolicy,
    /// Seed for the speed randomizer; entropy is used when absent.
    pub seed: Option<u64>,
    pub bodies: Vec<BodyLayout>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_rate: 40,
            travel_limit: 48.0,
            speed: SpeedPolicy::Random,
            seed: None,
            bodies: vec![
                BodyLayout {
                    x_offset: -2.0,
                    radius: 1.0,
                },
                BodyLayout {
                    x_offset: 2.0,
                    radius: 1.0,
                },
            ],
        }
    }
}

impl SimulationSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate.max(1)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid(
                "simulation.tick_rate must be greater than zero".into(),
            ));
        }

        if !self.travel_limit.is_finite() || self.travel_limit <= 0.0 {
            return Err(ConfigError::Invalid(
                "simulation.travel_limit must be a positive distance".into(),
            ));
        }

        if let SpeedPolicy::Fixed(speed) = self.speed {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "simulation.speed must be positive, got {speed}"
                )));
            }
        }

        if self.bodies.is_empty() {
            return Err(ConfigError::Invalid(
                "simulation must define at least one body".into(),
            ));
        }

        for (index, body) in self.bodies.iter().enumerate() {
            if !body.radius.is_finite() || body.radius <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "body {index} radius must be positive"
                )));
            }
        }

        Ok(())
    }
}

/// Top-level `settings.toml` document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    pub version: u32,
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            version: 1,
            render: RenderSettings::default(),
            simulation: SimulationSettings::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SceneConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads `path` if it exists, otherwise returns the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }
        self.render.validate()?;
        self.simulation.validate()
    }
}

/// Rejects sample counts without a jitter table. Zero means disabled.
pub fn check_sample_count(samples: u32) -> Result<(), ConfigError> {
    if samples == 0 || SUPPORTED_SAMPLE_COUNTS.contains(&samples) {
        Ok(())
    } else {
        Err(ConfigError::UnsupportedSampleCount(samples))
    }
}

/// Parses `off`/`none`/`0` or an explicit supported sample count.
pub fn parse_antialias(raw: &str) -> Result<u32, String> {
    let samples = normalize_antialias(raw)?;
    check_sample_count(samples).map_err(|err| err.to_string())?;
    Ok(samples)
}

fn normalize_antialias(raw: &str) -> Result<u32, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("anti-alias mode must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "off" | "none" | "disable" | "disabled" => Ok(0),
        other => other.parse::<u32>().map_err(|_| {
            format!("invalid anti-alias setting '{trimmed}'; use off or 2/4/8/15/24/66")
        }),
    }
}

/// Parses `random` or a positive per-tick speed.
pub fn parse_speed(raw: &str) -> Result<SpeedPolicy, String> {
    let trimmed = raw.trim();
    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "random" | "auto" => Ok(SpeedPolicy::Random),
        other => {
            let speed: f32 = other
                .parse()
                .map_err(|_| format!("invalid speed '{trimmed}'; use random or a number"))?;
            if !speed.is_finite() || speed <= 0.0 {
                return Err(format!("speed must be positive, got {speed}"));
            }
            Ok(SpeedPolicy::Fixed(speed))
        }
    }
}

fn deserialize_antialias<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    match Helper::deserialize(deserializer)? {
        Helper::Str(raw) => normalize_antialias(&raw).map_err(de::Error::custom),
        Helper::Num(value) => u32::try_from(value)
            .map_err(|_| de::Error::custom("antialias value must be non-negative")),
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}
