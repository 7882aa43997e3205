//! Widget config load/save for `~/.neura-chat/config.yaml`.
//! Sections: `server.*` (backend endpoints), `session.*` (user identity),
//! `ui.*` (background and language selectors, voice flag).

use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_CHAT_PATH: &str = "/chat";
pub const DEFAULT_UPGRADE_PATH: &str = "/upgrade";
pub const DEFAULT_HEALTH_PATH: &str = "/health";
pub const DEFAULT_USER_ID: &str = "guest";
pub const DEFAULT_BACKGROUNDS: [&str; 3] = ["neon-bg", "dark-bg", "light-bg"];
pub const DEFAULT_LANGUAGES: [&str; 3] = ["English", "French", "Spanish"];

/// Server section (base_url and endpoint paths).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ServerSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_path: Option<String>,
}

impl ServerSection {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn chat_path(&self) -> &str {
        self.chat_path.as_deref().unwrap_or(DEFAULT_CHAT_PATH)
    }

    pub fn upgrade_path(&self) -> &str {
        self.upgrade_path.as_deref().unwrap_or(DEFAULT_UPGRADE_PATH)
    }

    pub fn health_path(&self) -> &str {
        self.health_path.as_deref().unwrap_or(DEFAULT_HEALTH_PATH)
    }
}

/// Session section (static user identifier).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SessionSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl SessionSection {
    pub fn user_id(&self) -> &str {
        self.user_id.as_deref().unwrap_or(DEFAULT_USER_ID)
    }
}

/// UI section. Empty `backgrounds`/`languages` fall back to the built-in lists.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct UiSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backgrounds: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_enabled: Option<bool>,
}

impl UiSection {
    pub fn backgrounds(&self) -> Vec<String> {
        or_defaults(&self.backgrounds, &DEFAULT_BACKGROUNDS)
    }

    pub fn languages(&self) -> Vec<String> {
        or_defaults(&self.languages, &DEFAULT_LANGUAGES)
    }

    /// Initial background; the first enumerated one when unset.
    pub fn background(&self) -> String {
        match &self.background {
            Some(b) => b.clone(),
            None => self.backgrounds().remove(0),
        }
    }

    /// Initial language; the first enumerated one when unset.
    pub fn language(&self) -> String {
        match &self.language {
            Some(l) => l.clone(),
            None => self.languages().remove(0),
        }
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice_enabled.unwrap_or(true)
    }
}

fn or_defaults(values: &[String], defaults: &[&str]) -> Vec<String> {
    if values.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        values.to_vec()
    }
}

/// Full widget config.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub ui: UiSection,
}

/// Returns the default config file path: `~/.neura-chat/config.yaml` (platform-specific).
pub fn default_config_path() -> Option<PathBuf> {
    let home = home_dir()?;
    Some(home.join(".neura-chat").join("config.yaml"))
}

#[cfg(unix)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(windows)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE").map(PathBuf::from)
}

#[cfg(not(any(unix, windows)))]
fn home_dir() -> Option<PathBuf> {
    None
}

/// Load config from a YAML file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load config from `path`, or return defaults if the file does not exist.
pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    load(path)
}

/// Save config to a YAML file. Creates parent directory if missing.
pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
    }
    let contents = serde_yaml::to_string(config).map_err(|source| ConfigError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, contents).map_err(write_err)
}

/// Config load/save error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("failed to encode config for {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}
