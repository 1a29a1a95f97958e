// src/config/mod.rs

//! Configuration loading and validation for testmd.
//!
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file through the [`crate::fs::FileSystem`] abstraction and
//!   apply `TESTMD_*` environment overrides (`loader.rs`).
//! - Validate durations, module paths and exclude globs (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    ConfigFile, GenerateConfig, GenerateSection, RawConfigFile, RunnerConfig, RunnerSection,
};
