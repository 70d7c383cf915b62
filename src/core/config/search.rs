use crate::core::config::data::Config;
use crate::core::config::defaults::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, HOME_ENV, XDG_CONFIG_HOME_ENV,
};
use crate::core::config::io::ConfigError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ordered list of places a config file may live.
///
/// The first candidate that exists wins; later ones are never opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSearch {
    candidates: Vec<PathBuf>,
}

impl ConfigSearch {
    /// Candidates derived from the process environment.
    pub fn from_env() -> Self {
        Self::with_env(|key| std::env::var(key).ok())
    }

    /// Candidates derived from an arbitrary environment lookup.
    ///
    /// Priority: `./config.json`, then `$XDG_CONFIG_HOME/revChatGPT/config.json`,
    /// then `$HOME/.config/revChatGPT/config.json`. Unset or empty variables
    /// contribute no candidate.
    pub fn with_env<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut candidates = vec![PathBuf::from(CONFIG_FILE_NAME)];

        if let Some(config_home) = lookup(XDG_CONFIG_HOME_ENV).filter(|v| !v.is_empty()) {
            candidates.push(
                PathBuf::from(config_home)
                    .join(CONFIG_DIR_NAME)
                    .join(CONFIG_FILE_NAME),
            );
        }

        if let Some(home) = lookup(HOME_ENV).filter(|v| !v.is_empty()) {
            candidates.push(
                PathBuf::from(home)
                    .join(".config")
                    .join(CONFIG_DIR_NAME)
                    .join(CONFIG_FILE_NAME),
            );
        }

        Self { candidates }
    }

    /// Search only the given path, as requested with `--config`.
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            candidates: vec![path.into()],
        }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Load the first existing candidate, relative to the working directory.
    pub fn load(&self) -> Result<(PathBuf, Config), ConfigError> {
        self.load_in(Path::new("."))
    }

    /// Like [`ConfigSearch::load`], resolving relative candidates against `base`.
    pub fn load_in(&self, base: &Path) -> Result<(PathBuf, Config), ConfigError> {
        let path = self
            .candidates
            .iter()
            .map(|candidate| base.join(candidate))
            .find(|path| path.exists())
            .ok_or_else(|| self.not_found())?;
        debug!(path = %path.display(), "Loading configuration");
        let config = Config::load_from_path(&path)?;
        Ok((path, config))
    }

    fn not_found(&self) -> ConfigError {
        debug!(candidates = ?self.candidates, "No configuration file found");
        ConfigError::NotFound {
            searched: self.candidates.clone(),
        }
    }
}
