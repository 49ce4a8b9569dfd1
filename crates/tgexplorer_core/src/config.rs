//! User preferences.
//!
//! # Responsibility
//! - Hold the settings external integrations need (Praat path, sound
//!   extensions, audibility flag) as an explicit value passed to callers.
//! - Load and save them as TOML under the platform config directory.
//!
//! # Invariants
//! - A missing preferences file yields [`Preferences::default`].
//! - Sound extensions are stored without a leading dot.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "tgexplorer";
const CONFIG_FILE_NAME: &str = "preferences.toml";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Serialize(toml::ser::Error),
    /// The platform exposes no per-user config directory.
    NoConfigDir,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "preferences i/o error on `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid preferences file `{}`: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to serialize preferences: {err}"),
            Self::NoConfigDir => write!(f, "could not determine the user config directory"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
            Self::NoConfigDir => None,
        }
    }
}

/// Application preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Praat executable: a bare program name looked up on `PATH`, or a path.
    pub praat_path: String,
    /// Audio extensions tried, in order, next to a TextGrid.
    pub sound_extensions: Vec<String>,
    /// Scale the sound to full range before display.
    pub maximize_audibility: bool,
    pub activate_plugins: bool,
    /// Last opened TextGrid directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            praat_path: default_praat_path().to_string(),
            sound_extensions: vec![
                "wav".to_string(),
                "flac".to_string(),
                "mp3".to_string(),
                "aiff".to_string(),
            ],
            maximize_audibility: false,
            activate_plugins: false,
            data_dir: None,
        }
    }
}

impl Preferences {
    /// Loads preferences from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let mut preferences: Self =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        preferences.normalize();
        Ok(preferences)
    }

    /// Writes preferences to `path`, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Loads from [`default_preferences_path`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(default_preferences_path()?)
    }

    /// Parses a comma/space separated extension list (`".wav, flac"`).
    pub fn set_sound_extensions(&mut self, raw: &str) {
        self.sound_extensions = raw
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .map(str::to_string)
            .collect();
        self.normalize();
    }

    fn normalize(&mut self) {
        let mut normalized: Vec<String> = Vec::with_capacity(self.sound_extensions.len());
        for ext in &self.sound_extensions {
            let ext = ext.trim().trim_start_matches('.');
            if !ext.is_empty() && !normalized.iter().any(|known| known == ext) {
                normalized.push(ext.to_string());
            }
        }
        self.sound_extensions = normalized;
    }
}

/// `<config_dir>/tgexplorer/preferences.toml`.
pub fn default_preferences_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

fn default_praat_path() -> &'static str {
    if cfg!(target_os = "windows") {
        "Praat.exe"
    } else {
        "praat"
    }
}
