//! Configuration: window, logo source, logging and every tuning constant of
//! the particle field.
//!
//! Loaded from TOML (every field optional), then overridden from the
//! environment, then validated.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::types::Color;

/// Looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "particle-logo.toml";

pub const DEFAULT_LOGO_URL: &str = "https://cdn.jsdelivr.net/gh/VCRISff/E/SPa.png";

/// Largest logo side, in pixels, the mask builder will rasterize.
pub const MAX_DRAWN_SIDE: f32 = 16384.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    ParseError(String),
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Fixed RNG seed; random when absent.
    pub seed: Option<u64>,
    pub window: WindowConfig,
    pub logo: LogoConfig,
    pub field: FieldParams,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            seed: None,
            window: WindowConfig::default(),
            logo: LogoConfig::default(),
            field: FieldParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: usize,
    pub height: usize,
    pub target_fps: usize,
    /// Left mouse button acts as a finger: scatter only while held.
    pub touch_emulation: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Particle Logo".to_string(),
            width: 1280,
            height: 720,
            target_fps: 60,
            touch_emulation: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoConfig {
    /// `http(s)://` URL or a local file path.
    pub source: String,
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self { source: DEFAULT_LOGO_URL.to_string() }
    }
}

/// Tuning constants of the particle field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldParams {
    /// Particle count at the reference resolution.
    pub base_particle_count: u32,
    pub reference_width: u32,
    pub reference_height: u32,
    /// Viewports narrower than this use the mobile logo height.
    pub mobile_breakpoint: usize,
    pub mobile_logo_height: f32,
    pub desktop_logo_height: f32,
    pub logo_scale: f32,
    /// Mask alpha must be strictly above this.
    pub alpha_threshold: u8,
    pub sample_attempts: u32,
    /// Lifetime in frames, half-open `[min, max)`.
    pub life_min: i32,
    pub life_max: i32,
    /// Square side in pixels, half-open `[min, max)`.
    pub size_min: f32,
    pub size_max: f32,
    pub interaction_radius: f32,
    pub displacement: f32,
    /// Fraction of the remaining distance to base covered per frame.
    pub easing: f32,
    pub idle_color: Color,
    pub scattered_color: Color,
    pub background: Color,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            base_particle_count: 7000,
            reference_width: 1920,
            reference_height: 1080,
            mobile_breakpoint: 768,
            mobile_logo_height: 60.0,
            desktop_logo_height: 120.0,
            logo_scale: 3.5,
            alpha_threshold: 128,
            sample_attempts: 100,
            life_min: 50,
            life_max: 150,
            size_min: 0.5,
            size_max: 1.5,
            interaction_radius: 240.0,
            displacement: 60.0,
            easing: 0.1,
            idle_color: Color::WHITE,
            scattered_color: Color(0x4B_9C_D3),
            background: Color::BLACK,
        }
    }
}

impl FieldParams {
    pub fn is_mobile(&self, viewport_width: usize) -> bool {
        viewport_width < self.mobile_breakpoint
    }

    /// Drawn logo height for a viewport of this width.
    pub fn logo_height(&self, viewport_width: usize) -> f32 {
        let base = if self.is_mobile(viewport_width) {
            self.mobile_logo_height
        } else {
            self.desktop_logo_height
        };
        base * self.logo_scale
    }

    /// floor(base * sqrt(area / reference_area)); 0 for an empty canvas.
    pub fn target_count(&self, width: usize, height: usize) -> usize {
        let area = width as f64 * height as f64;
        let reference = self.reference_width as f64 * self.reference_height as f64;
        if area <= 0.0 || reference <= 0.0 {
            return 0;
        }
        (self.base_particle_count as f64 * (area / reference).sqrt()).floor() as usize
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let fail = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));
        if self.reference_width == 0 || self.reference_height == 0 {
            return fail("reference resolution must be non-zero");
        }
        let floats = [
            ("mobile_logo_height", self.mobile_logo_height),
            ("desktop_logo_height", self.desktop_logo_height),
            ("logo_scale", self.logo_scale),
            ("size_min", self.size_min),
            ("size_max", self.size_max),
            ("interaction_radius", self.interaction_radius),
            ("displacement", self.displacement),
            ("easing", self.easing),
        ];
        if let Some((name, _)) = floats.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::ValidationError(format!("{name} must be a finite number")));
        }
        if !(self.mobile_logo_height > 0.0 && self.desktop_logo_height > 0.0 && self.logo_scale > 0.0) {
            return fail("logo heights and logo_scale must be positive");
        }
        let tallest = self.mobile_logo_height.max(self.desktop_logo_height) * self.logo_scale;
        if !(tallest <= MAX_DRAWN_SIDE) {
            return fail("logo height times logo_scale exceeds 16384 px");
        }
        if self.sample_attempts == 0 {
            return fail("sample_attempts must be at least 1");
        }
        if self.life_min < 1 || self.life_min >= self.life_max {
            return fail("lifetime range must satisfy 1 <= life_min < life_max");
        }
        if !(self.size_min > 0.0 && self.size_min < self.size_max) {
            return fail("size range must satisfy 0 < size_min < size_max");
        }
        if !(self.interaction_radius > 0.0) {
            return fail("interaction_radius must be positive");
        }
        if !(self.displacement >= 0.0) {
            return fail("displacement must not be negative");
        }
        if !(self.easing > 0.0 && self.easing <= 1.0) {
            return fail("easing must be in (0, 1]");
        }
        Ok(())
    }
}

impl Config {
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Explicit path: must load. No path: `particle-logo.toml` if present,
    /// otherwise defaults. Runs before logging is set up, so it stays quiet.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = path {
            return Self::from_toml_file(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.exists() {
            return Self::from_toml_file(fallback);
        }
        Ok(Self::default())
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply `PARTICLE_LOGO_*` overrides from any lookup. Unparseable values
    /// are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("PARTICLE_LOGO_SOURCE") {
            self.logo.source = val;
        }
        override_parsed(&lookup, "PARTICLE_LOGO_WIDTH", &mut self.window.width);
        override_parsed(&lookup, "PARTICLE_LOGO_HEIGHT", &mut self.window.height);
        override_parsed(&lookup, "PARTICLE_LOGO_FPS", &mut self.window.target_fps);
        override_parsed(&lookup, "PARTICLE_LOGO_TOUCH", &mut self.window.touch_emulation);
        override_parsed(&lookup, "PARTICLE_LOGO_SEED", &mut self.seed);
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::ValidationError("window size must be non-zero".into()));
        }
        if self.logo.source.trim().is_empty() {
            return Err(ConfigError::ValidationError("logo source is empty".into()));
        }
        self.field.validate()
    }
}

trait FromEnv: Sized {
    fn from_env(raw: &str) -> Option<Self>;
}

impl FromEnv for usize {
    fn from_env(raw: &str) -> Option<Self> { raw.trim().parse().ok() }
}

impl FromEnv for bool {
    fn from_env(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }
}

impl FromEnv for Option<u64> {
    fn from_env(raw: &str) -> Option<Self> { raw.trim().parse().ok().map(Some) }
}

fn override_parsed<T, F>(lookup: &F, key: &str, slot: &mut T)
where
    T: FromEnv,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else { return };
    match T::from_env(&raw) {
        Some(v) => *slot = v,
        None => tracing::warn!(key, value = %raw, "ignoring unparseable override"),
    }
}
