// src/dag/mod.rs

//! Links parsed examples into a graph.
//!
//! `# Includes` edges form a parent -> child DAG. `# Requires` name examples
//! whose suite must be set up first; a require already satisfied by some
//! ancestor is dropped. Examples with no children, no remaining requires and
//! at least one parent are *leaves*: they become plain tests inside their
//! parents' suites instead of suites of their own.

use std::path::PathBuf;

use thiserror::Error;

pub mod graph;
pub mod linker;
pub mod paths;

pub use linker::Linker;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("unknown include '{include}' for example '{example}'")]
    UnknownInclude { example: String, include: String },

    #[error("cycle detected between examples involving '{0}'")]
    Cycle(String),

    #[error("more than one README maps to example '{0}'")]
    Duplicate(String),
}

/// An example together with its place in the graph.
///
/// `children` and `parents` are indices into the slice returned by
/// [`Linker::link`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedExample {
    /// Directory relative to the input root, `/`-separated; `""` for the root.
    pub name: String,
    pub dir: PathBuf,
    pub run: Vec<String>,
    pub cleanup: Vec<String>,
    /// Names of included examples.
    pub includes: Vec<String>,
    /// Names of required examples not already provided by an ancestor.
    pub requires: Vec<String>,
    pub children: Vec<usize>,
    pub parents: Vec<usize>,
    pub(crate) leaf: bool,
    pub(crate) dependencies: Vec<String>,
}

impl LinkedExample {
    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    /// Suites to set up before this one: remaining requires, then non-leaf
    /// children.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Last path segment of the name (`""` for the root).
    pub fn base_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or("")
    }
}
