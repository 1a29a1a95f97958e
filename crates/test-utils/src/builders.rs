#![allow(dead_code)]

use std::path::PathBuf;

use testmd::markdown::Example;

/// Builder for parsed `Example` values, for linker and generator tests.
pub struct ExampleBuilder {
    example: Example,
}

impl ExampleBuilder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            example: Example {
                dir: dir.into(),
                ..Example::default()
            },
        }
    }

    pub fn run(mut self, cmd: &str) -> Self {
        self.example.run.push(cmd.to_string());
        self
    }

    pub fn cleanup(mut self, cmd: &str) -> Self {
        self.example.cleanup.push(cmd.to_string());
        self
    }

    pub fn include(mut self, target: &str) -> Self {
        self.example.includes.push(target.to_string());
        self
    }

    pub fn require(mut self, target: &str) -> Self {
        self.example.requires.push(target.to_string());
        self
    }

    pub fn build(self) -> Example {
        self.example
    }
}

/// Builder for README markdown text.
#[derive(Default)]
pub struct ReadmeBuilder {
    title: String,
    includes: Vec<(String, String)>,
    requires: Vec<(String, String)>,
    run: Vec<String>,
    cleanup: Vec<String>,
}

impl ReadmeBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn include(mut self, text: &str, target: &str) -> Self {
        self.includes.push((text.to_string(), target.to_string()));
        self
    }

    pub fn require(mut self, text: &str, target: &str) -> Self {
        self.requires.push((text.to_string(), target.to_string()));
        self
    }

    pub fn run(mut self, script: &str) -> Self {
        self.run.push(script.to_string());
        self
    }

    pub fn cleanup(mut self, script: &str) -> Self {
        self.cleanup.push(script.to_string());
        self
    }

    pub fn build(self) -> String {
        let mut out = format!("# {}\n\nExample description.\n", self.title);

        let links = |heading: &str, items: &[(String, String)], out: &mut String| {
            if items.is_empty() {
                return;
            }
            out.push_str(&format!("\n## {heading}\n\n"));
            for (text, target) in items {
                out.push_str(&format!("- [{text}]({target})\n"));
            }
        };
        links("Includes", &self.includes, &mut out);
        links("Requires", &self.requires, &mut out);

        let scripts = |heading: &str, items: &[String], out: &mut String| {
            if items.is_empty() {
                return;
            }
            out.push_str(&format!("\n## {heading}\n"));
            for script in items {
                out.push_str(&format!("\n```bash\n{script}\n```\n"));
            }
        };
        scripts("Run", &self.run, &mut out);
        scripts("Cleanup", &self.cleanup, &mut out);

        out
    }
}
