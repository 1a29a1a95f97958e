// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use globset::GlobSet;
use serde::Deserialize;

use crate::exec::RetryPolicy;

/// Top-level configuration as read from `Testmd.toml`.
///
/// ```toml
/// [runner]
/// timeout = "1m"
/// poll_interval = "100ms"
/// shell = "bash"
///
/// [generate]
/// root_module = "crate::suites"
/// crate_name = "testmd"
/// exclude = [".git", "**/.git", "target", "**/target"]
/// ```
///
/// Both sections are optional and every key has a default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub runner: RunnerSection,

    #[serde(default)]
    pub generate: GenerateSection,
}

/// `[runner]` section: how generated suites drive their shells.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    /// How long a failing command keeps being retried, e.g. `"1m"`.
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Pause between retries, e.g. `"100ms"`.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    #[serde(default = "default_shell")]
    pub shell: String,
}

fn default_timeout() -> String {
    "1m".to_string()
}

fn default_poll_interval() -> String {
    "100ms".to_string()
}

fn default_shell() -> String {
    "bash".to_string()
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
            shell: default_shell(),
        }
    }
}

/// `[generate]` section: where generated code lives and what to scan.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateSection {
    /// Rust module path of the output directory, e.g. `"crate::suites"`.
    ///
    /// When unset, `crate::<output dir name>` is used.
    #[serde(default)]
    pub root_module: Option<String>,

    /// Path under which generated code refers to this crate.
    #[serde(default = "default_crate_name")]
    pub crate_name: String,

    /// Glob patterns (relative to the input directory) to skip while scanning.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

fn default_crate_name() -> String {
    "testmd".to_string()
}

fn default_exclude() -> Vec<String> {
    [".git", "**/.git", "target", "**/target"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for GenerateSection {
    fn default() -> Self {
        Self {
            root_module: None,
            crate_name: default_crate_name(),
            exclude: default_exclude(),
        }
    }
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// durations are parsed and globs compiled.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub runner: RunnerConfig,
    pub generate: GenerateConfig,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(runner: RunnerConfig, generate: GenerateConfig) -> Self {
        Self { runner, generate }
    }
}

/// Settings for shells opened by [`crate::harness::Suite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub shell: String,
    /// Directory relative runner paths are resolved against.
    pub base_dir: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            timeout: policy.timeout,
            poll_interval: policy.poll_interval,
            shell: default_shell(),
            base_dir: None,
        }
    }
}

impl RunnerConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            poll_interval: self.poll_interval,
            timeout: self.timeout,
        }
    }

    /// Resolve a runner directory against `base_dir`.
    pub fn resolve_dir(&self, dir: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if dir.is_relative() => base.join(dir),
            _ => dir.to_path_buf(),
        }
    }
}

/// Settings for the generator and scanner.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub root_module: Option<String>,
    pub crate_name: String,
    pub exclude_patterns: Vec<String>,
    pub exclude: GlobSet,
}

impl GenerateConfig {
    /// Whether a path relative to the input directory should be skipped.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        self.exclude.is_match(relative)
    }
}
