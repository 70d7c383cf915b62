use crate::core::config::data::{path_display, Config};
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur when loading configuration from disk.
#[derive(Debug)]
pub enum ConfigError {
    /// None of the candidate paths exist.
    NotFound {
        /// Every path that was checked, in priority order.
        searched: Vec<PathBuf>,
    },

    /// Failed to read the configuration file from disk.
    Read {
        /// Path to the configuration file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not a valid JSON object.
    Parse {
        /// Path to the configuration file with invalid JSON.
        path: PathBuf,
        /// The JSON deserialization error.
        source: serde_json::Error,
    },
}

impl ConfigError {
    fn display_path(path: &Path) -> String {
        path_display(path)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotFound { searched } => {
                write!(f, "No config file found.")?;
                if !searched.is_empty() {
                    let paths: Vec<String> =
                        searched.iter().map(|p| Self::display_path(p)).collect();
                    write!(f, " Searched: {}", paths.join(", "))?;
                }
                Ok(())
            }
            ConfigError::Read { path, source } => {
                write!(
                    f,
                    "Failed to read config at {}: {}",
                    Self::display_path(path),
                    source
                )
            }
            ConfigError::Parse { path, source } => {
                write!(
                    f,
                    "Failed to parse config at {}: {}",
                    Self::display_path(path),
                    source
                )
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::NotFound { .. } => None,
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

impl Config {
    /// Read and parse the config file at `config_path`.
    ///
    /// Unlike discovery, this does not treat a missing file as "no config":
    /// the caller has already decided this is the file to use.
    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Config, serde_json::Error> {
        serde_json::from_str(contents)
    }
}
