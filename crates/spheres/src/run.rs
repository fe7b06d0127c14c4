use anyhow::{Context, Result};
use compositor::{Scene, SystemClock};
use renderer::RendererConfig;
use sceneconfig::SceneConfig;
use tracing_subscriber::EnvFilter;

use crate::bindings::KeyBindings;
use crate::cli::Cli;
use crate::paths::AppPaths;

pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    tracing::info!(
        antialias = config.render.aa_level,
        depth_of_field = config.render.dof_level,
        motion_blur = config.render.blur_enabled,
        fov = config.render.fov_degrees,
        speed = %config.simulation.speed,
        bodies = config.simulation.bodies.len(),
        "starting spheres"
    );

    let scene = Scene::new(config, Box::new(SystemClock)).context("invalid scene settings")?;
    let mut bindings = KeyBindings::new(scene.settings());
    let renderer_config = RendererConfig {
        surface_size: cli.size,
        title: "spheres".to_string(),
    };
    renderer::run(scene, renderer_config, move |key, scene| {
        bindings.handle(key, scene)
    })
}

/// Reads the settings file (if any) and applies the command-line overrides.
pub fn load_config(cli: &Cli) -> Result<SceneConfig> {
    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => {
            let paths = AppPaths::discover()?;
            let path = paths.settings_file();
            tracing::debug!(config = %paths.config_dir().display(), "resolved spheres paths");
            SceneConfig::load_or_default(&path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?
        }
    };
    cli.apply(&mut config);
    config.validate().context("invalid settings")?;
    Ok(config)
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_config_file_is_loaded_then_overridden() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("custom.toml");
        fs::write(
            &path,
            "version = 1\n[render]\nantialias = 4\nfov = 40.0\n[simulation]\nseed = 9\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "spheres",
            "--config",
            path.to_str().unwrap(),
            "--fov",
            "70",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.render.aa_level, 4);
        assert_eq!(config.render.fov_degrees, 70.0);
        assert_eq!(config.simulation.seed, Some(9));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("absent.toml");
        let cli = Cli::try_parse_from(["spheres", "--config", path.to_str().unwrap()]).unwrap();
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn overrides_are_validated() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("settings.toml");
        fs::write(&path, "version = 1\n").unwrap();
        let cli = Cli::try_parse_from([
            "spheres",
            "--config",
            path.to_str().unwrap(),
            "--fov",
            "150",
        ])
        .unwrap();
        assert!(load_config(&cli).is_err());
    }
}
