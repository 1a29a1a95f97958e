// src/generate/naming.rs

//! Turning example names and commands into Rust tokens.

use std::path::Path;

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait",
    "true", "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do",
    "final", "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Every run of characters outside `[A-Za-z0-9]` becomes `_`; lowercased.
pub fn normalize_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// A normalized name that is also usable as a module or file name.
pub fn module_ident(segment: &str) -> String {
    let mut ident = normalize_name(segment);
    if ident.is_empty() {
        ident.push('_');
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if KEYWORDS.contains(&ident.as_str()) || ident == "_" {
        ident.push('_');
    }
    ident
}

/// Module segments for a slash-separated example name (`[]` for the root).
pub fn module_segments(name: &str) -> Vec<String> {
    name.split('/')
        .filter(|s| !s.is_empty())
        .map(module_ident)
        .collect()
}

/// `test_<normalized base name>`.
pub fn test_ident(base_name: &str) -> String {
    let normalized = normalize_name(base_name);
    let trimmed = normalized.trim_matches('_');
    if trimmed.is_empty() {
        "test".to_string()
    } else {
        format!("test_{trimmed}")
    }
}

/// `crate::<output dir name>`, the default module path of generated code.
pub fn default_root_module(output_dir: &Path) -> String {
    let name = output_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("crate::{}", module_ident(&name))
}

/// A Rust raw string literal containing exactly `s`.
///
/// Uses one more `#` than the longest `"#...` run inside `s`.
pub fn rust_string_literal(s: &str) -> String {
    let mut longest = 0;
    let bytes = s.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'"' {
            let run = bytes[i + 1..].iter().take_while(|&&c| c == b'#').count();
            longest = longest.max(run);
        }
    }
    let fence = "#".repeat(longest + 1);
    format!("r{fence}\"{s}\"{fence}")
}
