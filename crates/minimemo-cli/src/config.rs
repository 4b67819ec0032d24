//! Persistent CLI configuration.

use std::path::{Path, PathBuf};

use minimemo_core::util::{is_web_url, non_blank, non_blank_owned};
use serde::{Deserialize, Serialize};

use crate::cli::ConfigKey;

const CONFIG_FILE_NAME: &str = "cli-config.json";
const APP_DIR_NAME: &str = "minimemo";

pub const CONFIG_PATH_ENV: &str = "MINIMEMO_CONFIG";
pub const DATA_DIR_ENV: &str = "MINIMEMO_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// File path or http(s) URL of a JSON calendar feed; the demo calendar is
    /// used when unset.
    #[serde(default)]
    pub calendar_feed: Option<String>,
    #[serde(default)]
    pub calendar_token: Option<String>,
    #[serde(default = "default_notify_on_fire")]
    pub notify_on_fire: bool,
    /// Command used to open meeting links instead of the platform opener.
    #[serde(default)]
    pub open_command: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            data_dir: None,
            calendar_feed: None,
            calendar_token: None,
            notify_on_fire: default_notify_on_fire(),
            open_command: None,
        }
    }
}

const fn default_config_version() -> u32 {
    1
}

const fn default_notify_on_fire() -> bool {
    true
}

pub fn default_config_path() -> Result<PathBuf, String> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or_else(|| "Failed to resolve CLI config directory".to_string())
}

pub fn default_data_dir() -> Result<PathBuf, String> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| "Failed to resolve CLI data directory".to_string())
}

fn normalize_path_option(value: Option<PathBuf>) -> Option<PathBuf> {
    value.filter(|path| !path.as_os_str().is_empty())
}

impl CliConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, String> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    /// Pick the data directory: command line, then environment, then config,
    /// then the platform data dir.
    pub fn resolve_data_dir(
        &self,
        explicit: Option<PathBuf>,
        from_env: Option<PathBuf>,
    ) -> Result<PathBuf, String> {
        if let Some(dir) = normalize_path_option(explicit)
            .or_else(|| normalize_path_option(from_env))
            .or_else(|| self.data_dir.clone())
        {
            return Ok(dir);
        }
        default_data_dir()
    }

    /// Apply `config set`. An empty value unsets optional keys.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), String> {
        let text = non_blank(value);
        match key {
            ConfigKey::DataDir => self.data_dir = text.map(PathBuf::from),
            ConfigKey::CalendarFeed => {
                if let Some(feed) = text.as_deref() {
                    if feed.contains("://") && !is_web_url(feed) {
                        return Err(format!(
                            "calendar feed must be a file path or an http(s) URL, got '{feed}'"
                        ));
                    }
                }
                self.calendar_feed = text;
            }
            ConfigKey::CalendarToken => self.calendar_token = text,
            ConfigKey::NotifyOnFire => {
                self.notify_on_fire = match text.as_deref().map(str::to_ascii_lowercase).as_deref()
                {
                    None | Some("true" | "yes" | "on" | "1") => true,
                    Some("false" | "no" | "off" | "0") => false,
                    Some(other) => {
                        return Err(format!("notify-on-fire expects true or false, got '{other}'"))
                    }
                };
            }
            ConfigKey::OpenCommand => self.open_command = text,
        }
        Ok(())
    }

    fn normalize(&mut self) {
        self.data_dir = normalize_path_option(self.data_dir.take());
        self.calendar_feed = non_blank_owned(self.calendar_feed.take());
        self.calendar_token = non_blank_owned(self.calendar_token.take());
        self.open_command = non_blank_owned(self.open_command.take());
    }
}
