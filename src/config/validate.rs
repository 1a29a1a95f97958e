// src/config/validate.rs

use std::time::Duration;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::model::{
    ConfigFile, GenerateConfig, GenerateSection, RawConfigFile, RunnerConfig, RunnerSection,
};
use crate::errors::{Result, TestmdError};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TestmdError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let runner = RunnerConfig::try_from(raw.runner)?;
        let generate = GenerateConfig::try_from(raw.generate)?;
        Ok(ConfigFile::new_unchecked(runner, generate))
    }
}

impl TryFrom<RunnerSection> for RunnerConfig {
    type Error = crate::errors::TestmdError;

    fn try_from(raw: RunnerSection) -> std::result::Result<Self, Self::Error> {
        let timeout = duration_field("[runner].timeout", &raw.timeout)?;
        let poll_interval = duration_field("[runner].poll_interval", &raw.poll_interval)?;
        validate_poll_interval("[runner].poll_interval", poll_interval)?;
        validate_shell("[runner].shell", &raw.shell)?;

        Ok(RunnerConfig {
            timeout,
            poll_interval,
            shell: raw.shell,
            base_dir: None,
        })
    }
}

impl TryFrom<GenerateSection> for GenerateConfig {
    type Error = crate::errors::TestmdError;

    fn try_from(raw: GenerateSection) -> std::result::Result<Self, Self::Error> {
        if let Some(module) = &raw.root_module {
            validate_module_path("[generate].root_module", module)?;
        }
        validate_module_path("[generate].crate_name", &raw.crate_name)?;
        let exclude = build_globset(&raw.exclude)?;

        Ok(GenerateConfig {
            root_module: raw.root_module,
            crate_name: raw.crate_name,
            exclude_patterns: raw.exclude,
            exclude,
        })
    }
}

pub(crate) fn duration_field(field: &str, value: &str) -> Result<Duration> {
    parse_duration(value)
        .map_err(|e| TestmdError::ConfigError(format!("{field} is not a valid duration: {e}")))
}

pub(crate) fn validate_poll_interval(field: &str, value: Duration) -> Result<()> {
    if value.is_zero() {
        return Err(TestmdError::ConfigError(format!(
            "{field} must be greater than zero"
        )));
    }
    Ok(())
}

pub(crate) fn validate_shell(field: &str, shell: &str) -> Result<()> {
    if shell.trim().is_empty() {
        return Err(TestmdError::ConfigError(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Accepts `a`, `a::b`, `crate::a::b`: non-empty segments of word characters.
fn validate_module_path(field: &str, path: &str) -> Result<()> {
    let valid = !path.is_empty()
        && path.split("::").all(|seg| {
            !seg.is_empty() && seg.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });

    if !valid {
        return Err(TestmdError::ConfigError(format!(
            "{field} '{path}' is not a Rust module path"
        )));
    }
    Ok(())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            TestmdError::ConfigError(format!("invalid exclude pattern '{pattern}': {e}"))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| TestmdError::ConfigError(format!("failed to build exclude set: {e}")))
}
