use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use vizsync::session::SessionSettings;
use vizsync::sync::beat::DEFAULT_BEAT_DECAY;
use vizsync::sync::{
    Feature, DEFAULT_BAND_RESPONSIVENESS, DEFAULT_CHROMA_RESPONSIVENESS, DEFAULT_RESPONSIVENESS,
};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub smoothing: SmoothingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaybackConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default)]
    pub start: f32,
    #[serde(default)]
    pub end: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmoothingConfig {
    #[serde(default = "default_responsiveness")]
    pub default: f32,
    #[serde(default = "default_band_responsiveness")]
    pub bands: f32,
    #[serde(default = "default_chroma_responsiveness")]
    pub chroma: f32,
    #[serde(default = "default_beat_decay")]
    pub beat_decay: f32,
    /// Per-feature overrides, on top of each feature's tuned default
    #[serde(default)]
    pub features: HashMap<Feature, f32>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            start: 0.0,
            end: None,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            default: default_responsiveness(),
            bands: default_band_responsiveness(),
            chroma: default_chroma_responsiveness(),
            beat_decay: default_beat_decay(),
            features: HashMap::new(),
        }
    }
}

fn default_fps() -> u32 { 60 }
fn default_responsiveness() -> f32 { DEFAULT_RESPONSIVENESS }
fn default_band_responsiveness() -> f32 { DEFAULT_BAND_RESPONSIVENESS }
fn default_chroma_responsiveness() -> f32 { DEFAULT_CHROMA_RESPONSIVENESS }
fn default_beat_decay() -> f32 { DEFAULT_BEAT_DECAY }

impl Config {
    pub fn validate(&self) -> Result<()> {
        check_playback(self.playback.fps, self.playback.start, self.playback.end)
            .context("Invalid [playback] section")?;
        let named = [
            ("smoothing.default", self.smoothing.default),
            ("smoothing.bands", self.smoothing.bands),
            ("smoothing.chroma", self.smoothing.chroma),
        ];
        for (name, r) in named {
            check_responsiveness(name, r)?;
        }
        for (feature, &r) in &self.smoothing.features {
            check_responsiveness(&format!("smoothing.features.{}", feature), r)?;
        }
        if !(self.smoothing.beat_decay > 0.0) {
            anyhow::bail!("smoothing.beat_decay must be positive, got {}", self.smoothing.beat_decay);
        }
        Ok(())
    }

    pub fn session_settings(&self) -> SessionSettings {
        let mut settings = SessionSettings {
            default_responsiveness: self.smoothing.default,
            band_responsiveness: self.smoothing.bands,
            chroma_responsiveness: self.smoothing.chroma,
            beat_decay: self.smoothing.beat_decay,
            ..SessionSettings::default()
        };
        settings
            .feature_responsiveness
            .extend(self.smoothing.features.iter().map(|(&f, &r)| (f, r)));
        settings
    }
}

/// Playback bounds must describe a finite run, whether they come from the
/// config file or the command line.
pub fn check_playback(fps: u32, start: f32, end: Option<f32>) -> Result<()> {
    if fps == 0 {
        anyhow::bail!("fps must be at least 1");
    }
    if !start.is_finite() {
        anyhow::bail!("start must be a finite time, got {}", start);
    }
    if let Some(end) = end {
        if !end.is_finite() {
            anyhow::bail!("end must be a finite time, got {}", end);
        }
    }
    Ok(())
}

fn check_responsiveness(name: &str, r: f32) -> Result<()> {
    if r > 0.0 && r <= 1.0 {
        Ok(())
    } else {
        anyhow::bail!("{} must be in (0, 1], got {}", name, r)
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Invalid config")?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Failed to load config: {}", path.display()))
}
