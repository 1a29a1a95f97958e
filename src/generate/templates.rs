// src/generate/templates.rs

use minijinja::{AutoEscape, Environment, context};
use serde::Serialize;

use crate::errors::Result;

const MODULE_TEMPLATE: &str = include_str!("templates/module.rs.jinja");
const MODULE: &str = "module.rs";

/// Render input for one leaf example inside a suite.
///
/// Every string field except `name` is an already-formatted Rust literal.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TestTemplate {
    pub name: String,
    pub dir: String,
    pub cleanup: Vec<String>,
    pub run: Vec<String>,
}

/// Render input for one non-leaf example.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SuiteTemplate {
    /// Example name as shown in doc comments.
    pub title: String,
    pub dir: String,
    /// Module paths whose `setup_suite` runs first.
    pub dependencies: Vec<String>,
    pub cleanup: Vec<String>,
    pub run: Vec<String>,
    pub tests: Vec<TestTemplate>,
}

/// Runner settings baked into the `suite` entry point.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunnerDefaults {
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
    /// Rust literal.
    pub shell: String,
}

pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_template(MODULE, MODULE_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Contents of one `mod.rs`: child module declarations plus an optional
    /// suite.
    pub fn render_module(
        &self,
        crate_name: &str,
        children: &[String],
        suite: Option<&SuiteTemplate>,
        runner: &RunnerDefaults,
    ) -> Result<String> {
        let template = self.env.get_template(MODULE)?;
        let rendered = template.render(context! {
            crate_name => crate_name,
            children => children,
            suite => suite,
            timeout_ms => runner.timeout_ms,
            poll_interval_ms => runner.poll_interval_ms,
            shell => &runner.shell,
        })?;
        Ok(rendered)
    }
}
