use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub idle: IdleConfig,
    #[serde(default)]
    pub placeholder: PlaceholderConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

/// Panel geometry and render pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Labels longer than this many characters scroll.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    /// Gap appended to every label; sets the distance between marquee loops.
    #[serde(default = "default_label_spacer")]
    pub label_spacer: String,
    #[serde(default = "default_text_refresh_ms")]
    pub text_refresh_ms: u64,
    #[serde(default = "default_progress_refresh_ms")]
    pub progress_refresh_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
}

/// Idle mode: entered while nothing is playing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdleConfig {
    /// Added to `poll.interval_ms` while idle.
    #[serde(default = "default_idle_poll_delta_ms")]
    pub poll_delta_ms: u64,
    /// Progress refresh while idle; short so the animation stays smooth.
    #[serde(default = "default_idle_progress_refresh_ms")]
    pub progress_refresh_ms: u64,
    #[serde(default = "default_idle_low_px")]
    pub low_px: u32,
    #[serde(default = "default_idle_high_px")]
    pub high_px: u32,
    #[serde(default = "default_idle_step_ms")]
    pub step_ms: u64,
    #[serde(default = "default_idle_synthetic_duration_ms")]
    pub synthetic_duration_ms: u64,
    #[serde(default = "default_idle_track_label")]
    pub track_label: String,
    #[serde(default)]
    pub artist_label: String,
}

/// What the panel shows before the first successful poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceholderConfig {
    #[serde(default = "default_placeholder_track")]
    pub track_label: String,
    #[serde(default)]
    pub artist_label: String,
    #[serde(default = "default_placeholder_progress")]
    pub progress_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Script replayed by the scripted now-playing source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<PathBuf>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("idle bounds must satisfy low_px < high_px (got {low} / {high})")]
    IdleBounds { low: u32, high: u32 },
    #[error("idle.high_px ({high}) exceeds display width ({width})")]
    IdleBeyondWidth { high: u32, width: u32 },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            max_chars: default_max_chars(),
            label_spacer: default_label_spacer(),
            text_refresh_ms: default_text_refresh_ms(),
            progress_refresh_ms: default_progress_refresh_ms(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            poll_delta_ms: default_idle_poll_delta_ms(),
            progress_refresh_ms: default_idle_progress_refresh_ms(),
            low_px: default_idle_low_px(),
            high_px: default_idle_high_px(),
            step_ms: default_idle_step_ms(),
            synthetic_duration_ms: default_idle_synthetic_duration_ms(),
            track_label: default_idle_track_label(),
            artist_label: String::new(),
        }
    }
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            track_label: default_placeholder_track(),
            artist_label: String::new(),
            progress_text: default_placeholder_progress(),
        }
    }
}

fn default_width() -> u32 {
    128
}

fn default_height() -> u32 {
    64
}

fn default_max_chars() -> usize {
    15
}

fn default_label_spacer() -> String {
    "   ".to_string()
}

fn default_text_refresh_ms() -> u64 {
    250
}

fn default_progress_refresh_ms() -> u64 {
    1000
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_idle_poll_delta_ms() -> u64 {
    13_000
}

fn default_idle_progress_refresh_ms() -> u64 {
    200
}

fn default_idle_low_px() -> u32 {
    13
}

fn default_idle_high_px() -> u32 {
    119
}

fn default_idle_step_ms() -> u64 {
    1000
}

fn default_idle_synthetic_duration_ms() -> u64 {
    16_000
}

fn default_idle_track_label() -> String {
    "Nothing is playing.".to_string()
}

fn default_placeholder_track() -> String {
    "Loading...".to_string()
}

fn default_placeholder_progress() -> String {
    "00:00 / 00:00".to_string()
}

impl DisplayConfig {
    pub fn text_refresh(&self) -> Duration {
        Duration::from_millis(self.text_refresh_ms)
    }

    pub fn progress_refresh(&self) -> Duration {
        Duration::from_millis(self.progress_refresh_ms)
    }
}

impl IdleConfig {
    pub fn progress_refresh(&self) -> Duration {
        Duration::from_millis(self.progress_refresh_ms)
    }
}

impl Config {
    /// Load from the default location, writing a default file on first run.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            tracing::info!("Wrote default config to {:?}", config_path);
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let nonzero = [
            ("display.width", self.display.width as u64),
            ("display.height", self.display.height as u64),
            ("display.max_chars", self.display.max_chars as u64),
            ("display.text_refresh_ms", self.display.text_refresh_ms),
            ("display.progress_refresh_ms", self.display.progress_refresh_ms),
            ("poll.interval_ms", self.poll.interval_ms),
            ("idle.progress_refresh_ms", self.idle.progress_refresh_ms),
            ("idle.step_ms", self.idle.step_ms),
            ("idle.synthetic_duration_ms", self.idle.synthetic_duration_ms),
        ];
        if let Some((name, _)) = nonzero.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Zero(*name));
        }

        if self.idle.low_px >= self.idle.high_px {
            return Err(ConfigError::IdleBounds {
                low: self.idle.low_px,
                high: self.idle.high_px,
            });
        }
        if self.idle.high_px > self.display.width {
            return Err(ConfigError::IdleBeyondWidth {
                high: self.idle.high_px,
                width: self.display.width,
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }

    pub fn idle_poll_delta(&self) -> Duration {
        Duration::from_millis(self.idle.poll_delta_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            poll: PollConfig::default(),
            idle: IdleConfig::default(),
            placeholder: PlaceholderConfig::default(),
            source: SourceConfig::default(),
        }
    }
}
