//! # Configuration
//!
//! Startup parameters for the cube. [`Config::default`] reproduces the reference scene; native
//! builds may override a few values through environment variables:
//!
//! | Variable              | Meaning                              | Default    |
//! |-----------------------|--------------------------------------|------------|
//! | `CUBE_MODE`           | `animated` or `static`               | `animated` |
//! | `CUBE_ROTATION_SPEED` | rotation speed in degrees per second | `20`       |
//! | `CUBE_TRANSLATION`    | model offset along x                 | `0`        |
//! | `CUBE_SCALE`          | model scale factor                   | `1`        |
//!
//! Logging is configured separately through `RUST_LOG` (see `env_logger`).

use anyhow::{bail, Context};

use crate::camera::Camera;
use crate::pipeline::PipelineMode;
use crate::transform::{AnimationState, ROTATION_SPEED};

pub const MODE_VAR: &str = "CUBE_MODE";
pub const ROTATION_SPEED_VAR: &str = "CUBE_ROTATION_SPEED";
pub const TRANSLATION_VAR: &str = "CUBE_TRANSLATION";
pub const SCALE_VAR: &str = "CUBE_SCALE";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mode: PipelineMode,
    /// Degrees per second.
    pub rotation_speed: f32,
    pub translation: f32,
    pub scale: f32,
    pub camera: Camera,
    pub clear_color: wgpu::Color,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: PipelineMode::Animated,
            rotation_speed: ROTATION_SPEED,
            translation: 0.0,
            scale: 1.0,
            camera: Camera::default(),
            clear_color: wgpu::Color::BLACK,
        }
    }
}

impl Config {
    /// Reads overrides from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from a key lookup, starting from the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(mode) = lookup(MODE_VAR) {
            config.mode = parse_mode(&mode).with_context(|| format!("invalid {MODE_VAR}"))?;
        }
        if let Some(value) = lookup(ROTATION_SPEED_VAR) {
            config.rotation_speed = parse_finite(ROTATION_SPEED_VAR, &value)?;
        }
        if let Some(value) = lookup(TRANSLATION_VAR) {
            config.translation = parse_finite(TRANSLATION_VAR, &value)?;
        }
        if let Some(value) = lookup(SCALE_VAR) {
            config.scale = parse_finite(SCALE_VAR, &value)?;
        }

        Ok(config)
    }

    /// Animation state the pipeline starts from (and returns to in the static variant).
    pub fn initial_state(&self) -> AnimationState {
        AnimationState {
            translation: self.translation,
            scale: self.scale,
            rotation: 0.0,
        }
    }
}

fn parse_mode(value: &str) -> anyhow::Result<PipelineMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "animated" => Ok(PipelineMode::Animated),
        "static" | "static-camera" => Ok(PipelineMode::StaticCamera),
        other => bail!("unknown mode {other:?}, expected \"animated\" or \"static\""),
    }
}

fn parse_finite(name: &str, value: &str) -> anyhow::Result<f32> {
    let parsed: f32 = value
        .trim()
        .parse()
        .with_context(|| format!("{name} is not a number: {value:?}"))?;
    if !parsed.is_finite() {
        bail!("{name} must be finite, got {value:?}");
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.rotation_speed, 20.0);
        assert_eq!(config.initial_state(), AnimationState::default());
    }

    #[test]
    fn reads_every_override() {
        let config = Config::from_lookup(lookup(&[
            (MODE_VAR, "Static"),
            (ROTATION_SPEED_VAR, "45.5"),
            (TRANSLATION_VAR, " -0.5 "),
            (SCALE_VAR, "2"),
        ]))
        .unwrap();
        assert_eq!(config.mode, PipelineMode::StaticCamera);
        assert_eq!(config.rotation_speed, 45.5);
        assert_eq!(config.initial_state().translation, -0.5);
        assert_eq!(config.initial_state().scale, 2.0);
    }

    #[test]
    fn rejects_unknown_mode() {
        let error = Config::from_lookup(lookup(&[(MODE_VAR, "spinning")])).unwrap_err();
        assert!(format!("{error:#}").contains(MODE_VAR));
    }

    #[test]
    fn rejects_non_numeric_and_non_finite_values() {
        let error = Config::from_lookup(lookup(&[(SCALE_VAR, "big")])).unwrap_err();
        assert!(error.to_string().contains(SCALE_VAR));

        let error = Config::from_lookup(lookup(&[(ROTATION_SPEED_VAR, "inf")])).unwrap_err();
        assert!(error.to_string().contains("finite"));
    }
}
