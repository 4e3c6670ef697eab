use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{AttendError, Result};
use crate::roster::{self, SeedStudent};
use crate::scan::ScannerConfig;

const APP_DIR: &str = "attendscan";
const SETTINGS_FILE: &str = "settings.json";

/// Runtime settings, read from `<config dir>/attendscan/settings.json` and
/// then overridden from the environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Shared login secret
    pub pin: String,
    /// Heading printed on the register
    pub institution: String,
    pub default_course_title: String,
    /// Where the four state entries are kept
    pub state_dir: PathBuf,
    /// JSON class list; the built-in list is used when unset
    pub roster_file: Option<PathBuf>,
    pub debounce_ms: u64,
    pub banner_ms: u64,
    /// External decoder, e.g. `zbarcam --raw --nodisplay`
    pub scanner_command: Option<String>,
    pub scanner: ScannerConfig,
    /// Default folder for exported registers
    pub export_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pin: "2024/58434".to_string(),
            institution: "UNIVERSITY OF OSUN".to_string(),
            default_course_title: "Software Design Architecture".to_string(),
            state_dir: default_state_dir(),
            roster_file: None,
            debounce_ms: 3000,
            banner_ms: 3000,
            scanner_command: None,
            scanner: ScannerConfig::default(),
            export_dir: PathBuf::from("."),
        }
    }
}

fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

fn default_state_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".attendscan"))
}

impl Settings {
    /// Settings file (if any) plus environment overrides
    pub fn load() -> Result<Self> {
        let mut settings = match config_dir().map(|dir| dir.join(SETTINGS_FILE)) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => {
                info!("No settings file found, using defaults");
                Self::default()
            }
        };
        settings.apply_env();
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&content)
            .map_err(|e| AttendError::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    fn apply_env(&mut self) {
        if let Some(pin) = var("ATTENDSCAN_PIN") {
            self.pin = pin;
        }
        if let Some(dir) = var("ATTENDSCAN_STATE_DIR") {
            self.state_dir = PathBuf::from(dir);
        }
        if let Some(file) = var("ATTENDSCAN_ROSTER") {
            self.roster_file = Some(PathBuf::from(file));
        }
        if let Some(command) = var("ATTENDSCAN_SCANNER_CMD") {
            self.scanner_command = Some(command);
        }
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::milliseconds(self.debounce_ms as i64)
    }

    pub fn banner_lifetime(&self) -> Duration {
        Duration::milliseconds(self.banner_ms as i64)
    }

    /// Class list the roster is seeded from and reset to on logout
    pub fn seed(&self) -> Result<Vec<SeedStudent>> {
        match &self.roster_file {
            Some(path) => roster::load_seed(path),
            None => roster::default_seed(),
        }
    }
}

fn var(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => {
            info!("{} set, overriding settings", key);
            Some(value)
        }
        Ok(_) => {
            warn!("{} is empty, ignoring", key);
            None
        }
        Err(_) => None,
    }
}
