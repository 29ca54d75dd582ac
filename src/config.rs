use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error};
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "cmdb";

/// Agent and store settings. Every key is optional in the YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Report server host name or address
    pub server: String,
    pub port: u16,
    /// Path of the report endpoint, e.g. `/assets/report/`
    pub url: String,
    /// Seconds before a report attempt is abandoned
    pub request_timeout: u64,
    /// Append-only delivery log
    pub log_path: PathBuf,
    /// SQLite file backing the asset store
    pub database: PathBuf,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("./log"));

        Settings {
            server: "127.0.0.1".to_string(),
            port: 8000,
            url: "/assets/report/".to_string(),
            request_timeout: 30,
            log_path: data_dir.join("report.log"),
            database: data_dir.join("cmdb.db"),
            log_level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Full URL the agent posts reports to.
    pub fn report_url(&self) -> String {
        let path = if self.url.starts_with('/') {
            self.url.clone()
        } else {
            format!("/{}", self.url)
        };
        format!("http://{}:{}{}", self.server, self.port, path)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadFile(String),
    BadYaml(String),
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadFile(path) => write!(f, "Could not read config file {path}"),
            ConfigError::BadYaml(err) => write!(f, "Failed to parse YAML config: {err}"),
        }
    }
}

/// Default config location, `<config_dir>/cmdb/config.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.yaml"))
}

/// Load settings from an explicit path, or from the default location if it
/// exists. An explicit path that cannot be read is an error; a missing
/// default file just means defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => {
                debug!("[config] No config file found, using defaults");
                return Ok(Settings::default());
            }
        },
    };

    let text = match fs::read_to_string(&path) {
        Ok(result) => result,
        Err(err) => {
            error!("[config] Failed to read {}: {err:?}", path.display());
            return Err(ConfigError::ReadFile(path.display().to_string()));
        }
    };

    parse_settings(&text)
}

pub fn parse_settings(text: &str) -> Result<Settings, ConfigError> {
    // An empty document deserializes to unit, not a map
    if text.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(text).map_err(|err| ConfigError::BadYaml(err.to_string()))
}
