// src/errors.rs

//! Crate-wide error type.
//!
//! The channel and driver layers have their own error enums
//! ([`SessionError`], [`RetryError`]) so callers can match on them; this
//! type wraps them for the generator pipeline and the suite harness.

use thiserror::Error;

use crate::dag::LinkError;
use crate::exec::{RetryError, SessionError};

#[derive(Error, Debug)]
pub enum TestmdError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Retry(#[from] RetryError),

    #[error("unknown runner #{0}")]
    UnknownRunner(usize),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TestmdError>;
