use crate::error::SettingsError;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "palt";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "PALT";

/// User-tunable settings. Every field has a default, so an empty or missing
/// file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Program used for load-module / unload-module.
    pub pactl: String,
    /// Mixer opened by the "Volume Control" button.
    pub volume_control: String,
    pub loopback_latency_msec: u32,
    pub null_sink_rate: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pactl: "pactl".to_string(),
            volume_control: "pavucontrol".to_string(),
            loopback_latency_msec: 1,
            null_sink_rate: 48000,
        }
    }
}

impl Settings {
    /// `$XDG_CONFIG_HOME/palt/config.toml`
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or(SettingsError::NoConfigDir)
    }

    /// Load from the default location, overridden by `PALT_*` variables.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path` (which may not exist), overridden by `PALT_*` variables.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        debug!("Loading settings from {}", path.display());
        let settings: Settings = Config::builder()
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
