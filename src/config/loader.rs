// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile, RunnerConfig};
use crate::config::validate::{duration_field, validate_poll_interval, validate_shell};
use crate::errors::Result;
use crate::fs::FileSystem;

/// Environment variables read by [`RunnerConfig::with_env_overrides`].
pub const ENV_TIMEOUT: &str = "TESTMD_TIMEOUT";
pub const ENV_POLL_INTERVAL: &str = "TESTMD_POLL_INTERVAL";
pub const ENV_SHELL: &str = "TESTMD_SHELL";
pub const ENV_BASE_DIR: &str = "TESTMD_BASE_DIR";

/// Load a configuration file and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for a
/// checked [`ConfigFile`].
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs.read_to_string(path.as_ref())?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

pub fn load_and_validate(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(fs, &path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Like [`load_and_validate`], but a missing file yields the defaults.
pub fn load_or_default(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    if !fs.exists(path) {
        debug!(path = ?path, "no config file; using defaults");
        return ConfigFile::try_from(RawConfigFile::default());
    }
    load_and_validate(fs, path)
}

/// `Testmd.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Testmd.toml")
}

impl RunnerConfig {
    /// Defaults overridden by the `TESTMD_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (normally the process environment).
    ///
    /// Empty values are ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = get(ENV_TIMEOUT) {
            self.timeout = duration_field(ENV_TIMEOUT, &value)?;
        }
        if let Some(value) = get(ENV_POLL_INTERVAL) {
            let interval = duration_field(ENV_POLL_INTERVAL, &value)?;
            validate_poll_interval(ENV_POLL_INTERVAL, interval)?;
            self.poll_interval = interval;
        }
        if let Some(value) = get(ENV_SHELL) {
            validate_shell(ENV_SHELL, &value)?;
            self.shell = value;
        }
        if let Some(value) = get(ENV_BASE_DIR) {
            self.base_dir = Some(PathBuf::from(value));
        }

        Ok(self)
    }
}
