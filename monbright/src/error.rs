use std::path::PathBuf;

use monbright_core::ControllerError;

/// Errors reported by the command line front end.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No config directory found, pass --settings")]
    NoConfigDir,

    #[error("No controllable monitors found")]
    NoMonitors,

    #[error("DDC/CI monitor control is only available on Windows")]
    Unsupported,
}
