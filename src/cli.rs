// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `testmd`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "testmd",
    version,
    about = "Generate shell-driven Rust test suites from markdown examples.",
    long_about = None
)]
pub struct CliArgs {
    /// Directory containing example READMEs.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Directory the generated modules are written to.
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Rust module path of OUTPUT_DIR (e.g. `crate::suites`).
    ///
    /// Overrides `[generate].root_module`; defaults to `crate::<OUTPUT_DIR name>`.
    #[arg(value_name = "ROOT_MODULE")]
    pub root_module: Option<String>,

    /// Path to the config file (TOML). A missing file means defaults.
    #[arg(long, value_name = "PATH", default_value = "Testmd.toml")]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TESTMD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse and link examples, print the plan, but write nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
