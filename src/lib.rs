// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod generate;
pub mod harness;
pub mod logging;
pub mod markdown;
pub mod scan;
pub mod types;

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::config::loader::load_or_default;
use crate::dag::paths::display_name;
use crate::dag::{LinkedExample, Linker};
use crate::fs::{FileSystem, RealFileSystem};
use crate::generate::naming::default_root_module;
use crate::generate::{GenerateSettings, GeneratedFile, Generator};
use crate::markdown::Parser;

/// Everything a run would produce, before anything is written.
#[derive(Debug, Clone)]
pub struct Plan {
    pub examples: Vec<LinkedExample>,
    pub files: Vec<GeneratedFile>,
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - README discovery and parsing
/// - linking and generation
/// - writing (skipped with `--dry-run`)
pub fn run(args: CliArgs) -> Result<()> {
    let fs = RealFileSystem;
    let cfg = load_or_default(&fs, &args.config)?;

    let plan = build_plan(
        &fs,
        &args.input_dir,
        &args.output_dir,
        args.root_module.clone(),
        &cfg,
    )?;

    if args.dry_run {
        print_dry_run(&plan);
        return Ok(());
    }

    write_plan(&fs, &plan)
}

/// Scan, parse, link and render the examples under `input_dir`.
///
/// READMEs that cannot be read are skipped with a warning.
pub fn build_plan(
    fs: &dyn FileSystem,
    input_dir: &Path,
    output_dir: &Path,
    root_module: Option<String>,
    cfg: &ConfigFile,
) -> Result<Plan> {
    let readmes = scan::find_readmes(fs, input_dir, &cfg.generate)?;
    info!(count = readmes.len(), input = %input_dir.display(), "found example READMEs");

    let parser = Parser::new()?;
    let mut examples = Vec::with_capacity(readmes.len());
    for path in &readmes {
        match parser.parse_file(fs, path) {
            Ok(example) => examples.push(example),
            Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable README"),
        }
    }

    let linked = Linker::new(input_dir).link(examples)?;

    let root_module = root_module
        .or_else(|| cfg.generate.root_module.clone())
        .unwrap_or_else(|| default_root_module(output_dir));
    debug!(%root_module, "resolved root module");

    let generator = Generator::new(GenerateSettings {
        output_dir: output_dir.to_path_buf(),
        root_module,
        crate_name: cfg.generate.crate_name.clone(),
        runner: cfg.runner.clone(),
    })?;
    let files = generator.generate(&linked)?;

    Ok(Plan {
        examples: linked,
        files,
    })
}

pub fn write_plan(fs: &dyn FileSystem, plan: &Plan) -> Result<()> {
    for file in &plan.files {
        fs.write(&file.path, file.contents.as_bytes())?;
        debug!(path = %file.path.display(), bytes = file.contents.len(), "wrote module");
    }
    info!(files = plan.files.len(), "generation complete");
    Ok(())
}

/// Simple dry-run output: print examples, their links and planned files.
fn print_dry_run(plan: &Plan) {
    println!("testmd dry-run");
    println!();

    println!("examples ({}):", plan.examples.len());
    for example in &plan.examples {
        let kind = if example.is_leaf() { "test" } else { "suite" };
        println!("  - {} ({kind})", display_name(&example.name));
        println!("      dir: {}", example.dir.display());
        if !example.dependencies().is_empty() {
            println!("      dependencies: {:?}", example.dependencies());
        }
        if !example.includes.is_empty() {
            println!("      includes: {:?}", example.includes);
        }
        if !example.run.is_empty() {
            println!("      run: {} block(s)", example.run.len());
        }
        if !example.cleanup.is_empty() {
            println!("      cleanup: {} block(s)", example.cleanup.len());
        }
    }
    println!();

    println!("files ({}):", plan.files.len());
    for file in &plan.files {
        println!("  - {}", file.path.display());
    }

    debug!("dry-run complete (nothing written)");
}
