// src/markdown/mod.rs

//! Example READMEs.
//!
//! An example is a markdown file whose `# Run` and `# Cleanup` sections hold
//! ```` ```bash ```` blocks and whose `# Includes` / `# Requires` sections
//! link to other example directories.

use std::path::PathBuf;

pub mod parser;
pub mod sections;

pub use parser::Parser;

/// One parsed README.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Example {
    /// Directory containing the README.
    pub dir: PathBuf,
    pub run: Vec<String>,
    pub cleanup: Vec<String>,
    /// Link targets of `# Includes`, relative to `dir`.
    pub includes: Vec<String>,
    /// Link targets of `# Requires`, relative to `dir`.
    pub requires: Vec<String>,
}
