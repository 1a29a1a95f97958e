// src/generate/mod.rs

//! Renders linked examples into Rust test modules.
//!
//! Layout under the output directory:
//!
//! - every non-leaf example `a/b` gets `a/b/mod.rs` (the root example gets
//!   the top-level `mod.rs`) holding `setup_suite`, one function per leaf
//!   child and a `#[tokio::test] suite` entry point;
//! - every directory on the way gets a `mod.rs` declaring its child modules.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::RunnerConfig;
use crate::dag::LinkedExample;
use crate::dag::paths::display_name;
use crate::errors::Result;

pub mod naming;
pub mod templates;

use naming::{module_segments, rust_string_literal, test_ident};
use templates::{RunnerDefaults, SuiteTemplate, TemplateEngine, TestTemplate};

const MOD_FILE: &str = "mod.rs";

#[derive(Debug, Clone)]
pub struct GenerateSettings {
    pub output_dir: PathBuf,
    /// Module path of `output_dir`, e.g. `crate::suites`.
    pub root_module: String,
    /// Path generated code uses to reach this crate.
    pub crate_name: String,
    pub runner: RunnerConfig,
}

/// One file to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Default)]
struct ModuleNode {
    children: BTreeSet<String>,
    suite: Option<SuiteTemplate>,
}

pub struct Generator {
    settings: GenerateSettings,
    engine: TemplateEngine,
}

impl Generator {
    pub fn new(settings: GenerateSettings) -> Result<Self> {
        Ok(Self {
            settings,
            engine: TemplateEngine::new()?,
        })
    }

    /// Render every module for `examples` (as returned by the linker).
    pub fn generate(&self, examples: &[LinkedExample]) -> Result<Vec<GeneratedFile>> {
        let mut tests: HashMap<usize, Vec<TestTemplate>> = HashMap::new();
        for example in examples.iter().filter(|e| e.is_leaf()) {
            for &parent in &example.parents {
                let bucket = tests.entry(parent).or_default();
                let name = unique_name(bucket, test_ident(example.base_name()));
                bucket.push(TestTemplate {
                    name,
                    dir: path_literal(&example.dir),
                    cleanup: literals(&example.cleanup),
                    run: literals(&example.run),
                });
            }
        }

        let mut modules: BTreeMap<Vec<String>, ModuleNode> = BTreeMap::new();
        modules.entry(Vec::new()).or_default();

        for (i, example) in examples.iter().enumerate() {
            if example.is_leaf() {
                continue;
            }

            let segments = module_segments(&example.name);
            for depth in 0..segments.len() {
                modules
                    .entry(segments[..depth].to_vec())
                    .or_default()
                    .children
                    .insert(segments[depth].clone());
                modules.entry(segments[..=depth].to_vec()).or_default();
            }

            let suite = SuiteTemplate {
                title: display_name(&example.name).to_string(),
                dir: path_literal(&example.dir),
                dependencies: example
                    .dependencies()
                    .iter()
                    .map(|dep| self.module_path(dep))
                    .collect(),
                cleanup: literals(&example.cleanup),
                run: literals(&example.run),
                tests: tests.remove(&i).unwrap_or_default(),
            };
            debug!(
                example = %suite.title,
                tests = suite.tests.len(),
                dependencies = suite.dependencies.len(),
                "planned suite"
            );
            modules.entry(segments).or_default().suite = Some(suite);
        }

        let runner = RunnerDefaults {
            timeout_ms: millis(self.settings.runner.timeout),
            poll_interval_ms: millis(self.settings.runner.poll_interval),
            shell: rust_string_literal(&self.settings.runner.shell),
        };

        let mut files = Vec::with_capacity(modules.len());
        for (segments, node) in &modules {
            let children: Vec<String> = node.children.iter().cloned().collect();
            let contents = self.engine.render_module(
                &self.settings.crate_name,
                &children,
                node.suite.as_ref(),
                &runner,
            )?;
            files.push(GeneratedFile {
                path: self.module_file(segments),
                contents,
            });
        }

        info!(
            files = files.len(),
            suites = modules.values().filter(|m| m.suite.is_some()).count(),
            output = %self.settings.output_dir.display(),
            "generated suite modules"
        );
        Ok(files)
    }

    /// `root_module::a::b` for example `a/b`.
    fn module_path(&self, name: &str) -> String {
        let mut path = self.settings.root_module.clone();
        for segment in module_segments(name) {
            path.push_str("::");
            path.push_str(&segment);
        }
        path
    }

    fn module_file(&self, segments: &[String]) -> PathBuf {
        let mut path = self.settings.output_dir.clone();
        path.extend(segments);
        path.join(MOD_FILE)
    }
}

fn literals(commands: &[String]) -> Vec<String> {
    commands.iter().map(|c| rust_string_literal(c)).collect()
}

fn path_literal(dir: &Path) -> String {
    let text = dir.to_string_lossy();
    if text.is_empty() {
        rust_string_literal(".")
    } else {
        rust_string_literal(&text)
    }
}

fn unique_name(existing: &[TestTemplate], base: String) -> String {
    let taken = |n: &str| existing.iter().any(|t| t.name == n);
    if !taken(&base) {
        return base;
    }
    let mut k = 2;
    loop {
        let candidate = format!("{base}_{k}");
        if !taken(&candidate) {
            return candidate;
        }
        k += 1;
    }
}

fn millis(d: std::time::Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
