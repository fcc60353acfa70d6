use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::location::{Coordinates, PositionSource};

pub const MIN_BPM: u32 = 60;
pub const MAX_BPM: u32 = 200;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Data endpoint: serves the dataset (`?api=true`) and receives
    /// access logs (`?log=true`).
    #[serde(default)]
    pub endpoint_url: String,
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,
    #[serde(default = "default_metronome_bpm")]
    pub metronome_bpm: u32,
    #[serde(default = "default_true")]
    pub narration_enabled: bool,
    #[serde(default = "default_speech_command")]
    pub speech_command: String,
    #[serde(default = "default_speech_rate")]
    pub speech_rate: f32,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub position_command: String,
    #[serde(default = "default_location_timeout_secs")]
    pub location_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub access_log_enabled: bool,
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_language() -> String {
    "PT".to_string()
}
fn default_theme() -> String {
    "socorro-dark".to_string()
}
fn default_geocode_url() -> String {
    "https://nominatim.openstreetmap.org/reverse".to_string()
}
fn default_metronome_bpm() -> u32 {
    110
}
fn default_true() -> bool {
    true
}
fn default_speech_command() -> String {
    if cfg!(target_os = "macos") {
        "say".to_string()
    } else {
        "espeak-ng".to_string()
    }
}
fn default_speech_rate() -> f32 {
    crate::narration::DEFAULT_RATE
}
fn default_location_timeout_secs() -> u64 {
    10
}
fn default_log_file() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("socorro")
        .join("socorro.log")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: default_language(),
            theme: default_theme(),
            endpoint_url: String::new(),
            geocode_url: default_geocode_url(),
            metronome_bpm: default_metronome_bpm(),
            narration_enabled: true,
            speech_command: default_speech_command(),
            speech_rate: default_speech_rate(),
            latitude: None,
            longitude: None,
            position_command: String::new(),
            location_timeout_secs: default_location_timeout_secs(),
            access_log_enabled: true,
            log_file: default_log_file(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_or_init(&Self::config_path())
    }

    /// Like `load_from`, but a missing file is first written with the
    /// defaults so there is something to edit.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            Config::default()
                .save_to(path)
                .with_context(|| format!("could not create {}", path.display()))?;
        }
        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str::<Config>(&content)?
        } else {
            Config::default()
        };
        config.normalize();
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("socorro")
            .join("config.toml")
    }

    /// Bring hand-edited values back into range.
    pub fn normalize(&mut self) {
        self.language = self.language.trim().to_uppercase();
        if self.language.is_empty() {
            self.language = default_language();
        }
        self.metronome_bpm = self.metronome_bpm.clamp(MIN_BPM, MAX_BPM);
        if !self.speech_rate.is_finite() || !(0.1..=3.0).contains(&self.speech_rate) {
            self.speech_rate = default_speech_rate();
        }
        if self.location_timeout_secs == 0 {
            self.location_timeout_secs = default_location_timeout_secs();
        }
        if self.theme.trim().is_empty() {
            self.theme = default_theme();
        }
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_secs)
    }

    /// Fixed coordinates win over a position command.
    pub fn position_source(&self) -> PositionSource {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => PositionSource::Fixed(Coordinates { lat, lon }),
            _ if !self.position_command.trim().is_empty() => {
                PositionSource::Command(self.position_command.trim().to_string())
            }
            _ => PositionSource::None,
        }
    }
}
