// src/scan.rs

//! Discovery of example READMEs under an input directory.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::config::GenerateConfig;
use crate::errors::Result;
use crate::fs::FileSystem;

pub const README: &str = "README.md";

/// Every `README.md` in `root` and its subdirectories, sorted.
///
/// Directories whose path relative to `root` matches an exclude glob are
/// not entered.
pub fn find_readmes(
    fs: &dyn FileSystem,
    root: &Path,
    config: &GenerateConfig,
) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let readme = dir.join(README);
        if fs.is_file(&readme) {
            trace!(path = %readme.display(), "found example");
            found.push(readme);
        }

        for entry in fs.read_dir(&dir)? {
            if !fs.is_dir(&entry) {
                continue;
            }
            let relative = entry.strip_prefix(root).unwrap_or(&entry);
            if config.is_excluded(relative) {
                debug!(path = %entry.display(), "skipping excluded directory");
                continue;
            }
            pending.push(entry);
        }
    }

    found.sort();
    debug!(root = %root.display(), count = found.len(), "scanned for examples");
    Ok(found)
}
