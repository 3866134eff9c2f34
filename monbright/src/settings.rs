use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use monbright_core::NeutralContrastSettings;
use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// Contents of `settings.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Neutral contrast reference per monitor name.
    pub neutral_contrast: NeutralContrastSettings,
}

/// `<config dir>/monbright/settings.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("monbright").join("settings.toml"))
}

impl Settings {
    /// Load settings, treating a missing file as empty settings.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(CliError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&contents).map_err(|source| CliError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write settings, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), CliError> {
        let contents = toml::to_string_pretty(self)?;
        let io_error = |source| CliError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(path, contents).map_err(io_error)?;
        debug!("saved settings to {}", path.display());
        Ok(())
    }
}
