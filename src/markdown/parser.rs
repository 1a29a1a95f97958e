// src/markdown/parser.rs

use std::path::{Path, PathBuf};

use regex::Regex;

use super::Example;
use super::sections::{bash_blocks, section};
use crate::errors::{Result, TestmdError};
use crate::fs::FileSystem;

pub const RUN_HEADING: &str = "# Run";
pub const CLEANUP_HEADING: &str = "# Cleanup";
pub const INCLUDES_HEADING: &str = "# Includes";
pub const REQUIRES_HEADING: &str = "# Requires";

/// Reads example READMEs into [`Example`] values.
#[derive(Debug, Clone)]
pub struct Parser {
    link: Regex,
}

impl Parser {
    pub fn new() -> Result<Self> {
        let link = Regex::new(r"\[[^\]]*\]\(([^)]*)\)")
            .map_err(|e| TestmdError::Other(anyhow::Error::new(e)))?;
        Ok(Self { link })
    }

    /// Parse markdown text. The returned example has an empty `dir`.
    pub fn parse(&self, source: &str) -> Example {
        Example {
            dir: PathBuf::new(),
            run: bash_blocks(section(source, RUN_HEADING)),
            cleanup: bash_blocks(section(source, CLEANUP_HEADING)),
            includes: self.links(section(source, INCLUDES_HEADING)),
            requires: self.links(section(source, REQUIRES_HEADING)),
        }
    }

    /// Read and parse a README; `dir` becomes the file's parent directory.
    pub fn parse_file(&self, fs: &dyn FileSystem, path: &Path) -> Result<Example> {
        let source = fs.read_to_string(path)?;
        let mut example = self.parse(&source);
        example.dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(example)
    }

    /// Targets of every `[text](target)` link in `section`, in order.
    fn links(&self, section: &str) -> Vec<String> {
        self.link
            .captures_iter(section)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .collect()
    }
}
