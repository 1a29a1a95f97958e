// src/dag/paths.rs

//! Lexical handling of slash-separated example names.

use std::path::{Component, Path};

/// Join `rel` onto `base` and resolve `.` / `..` without touching the disk.
///
/// A leading `/` on `rel` does not make it absolute. `..` segments that
/// climb above the root are kept, so such names never match an example.
pub fn clean_join(base: &str, rel: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for segment in base.split('/').chain(rel.split('/')) {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    parts.join("/")
}

/// Name of `dir` relative to `root`: slash-separated, `""` for the root itself.
///
/// Directories outside `root` keep their full (cleaned) path.
pub fn relative_name(root: &Path, dir: &Path) -> String {
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    let joined = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    clean_join("", &joined)
}

/// Human-readable form of a name (`.` for the root).
pub fn display_name(name: &str) -> &str {
    if name.is_empty() { "." } else { name }
}
