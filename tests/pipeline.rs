use std::error::Error;
use std::path::{Path, PathBuf};

use testmd::config::{ConfigFile, RawConfigFile};
use testmd::fs::mock::MockFileSystem;
use testmd::fs::{FileSystem, RealFileSystem};
use testmd::{build_plan, write_plan};
use testmd_test_utils::builders::ReadmeBuilder;
use testmd_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn default_config() -> ConfigFile {
    ConfigFile::try_from(RawConfigFile::default()).expect("defaults are valid")
}

fn docs_tree(fs: &MockFileSystem) {
    fs.add_file(
        "docs/README.md",
        ReadmeBuilder::new("Docs")
            .include("Basic", "basic")
            .include("Advanced", "advanced")
            .run("echo root")
            .build(),
    );
    fs.add_file(
        "docs/basic/README.md",
        ReadmeBuilder::new("Basic").run("echo basic").build(),
    );
    fs.add_file(
        "docs/advanced/README.md",
        ReadmeBuilder::new("Advanced")
            .include("Step", "step")
            .run("echo advanced")
            .cleanup("echo undo")
            .build(),
    );
    fs.add_file(
        "docs/advanced/step/README.md",
        ReadmeBuilder::new("Step").run("echo step").build(),
    );
}

#[test]
fn plan_covers_every_readme() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    docs_tree(&fs);

    let plan = build_plan(
        &fs,
        Path::new("docs"),
        Path::new("tests/suites"),
        None,
        &default_config(),
    )?;

    let mut names: Vec<&str> = plan.examples.iter().map(|e| e.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["", "advanced", "advanced/step", "basic"]);

    let paths: Vec<&Path> = plan.files.iter().map(|f| f.path.as_path()).collect();
    assert_eq!(paths.len(), 2);
    assert!(paths.contains(&Path::new("tests/suites/mod.rs")));
    assert!(paths.contains(&Path::new("tests/suites/advanced/mod.rs")));

    let root = &plan
        .files
        .iter()
        .find(|f| f.path == Path::new("tests/suites/mod.rs"))
        .ok_or("root module missing")?
        .contents;
    assert!(root.contains("crate::suites::advanced::setup_suite(s).await?;"));
    assert!(root.contains("async fn test_basic("));
    Ok(())
}

#[test]
fn root_module_prefers_cli_over_config() -> TestResult {
    let fs = MockFileSystem::new();
    docs_tree(&fs);

    let mut cfg = default_config();
    cfg.generate.root_module = Some("crate::from_config".to_string());

    let plan = build_plan(&fs, Path::new("docs"), Path::new("out"), None, &cfg)?;
    assert!(plan.files[0].contents.contains("crate::from_config::advanced::setup_suite"));

    let plan = build_plan(
        &fs,
        Path::new("docs"),
        Path::new("out"),
        Some("crate::from_cli".to_string()),
        &cfg,
    )?;
    assert!(plan.files[0].contents.contains("crate::from_cli::advanced::setup_suite"));
    Ok(())
}

#[test]
fn excluded_directories_are_not_scanned() -> TestResult {
    let fs = MockFileSystem::new();
    docs_tree(&fs);
    // Would fail linking (unknown include) if it were picked up.
    fs.add_file(
        "docs/basic/target/README.md",
        ReadmeBuilder::new("Build output").include("Nothing", "nothing").build(),
    );

    let plan = build_plan(
        &fs,
        Path::new("docs"),
        Path::new("tests/suites"),
        None,
        &default_config(),
    )?;
    assert_eq!(plan.examples.len(), 4);
    Ok(())
}

#[test]
fn broken_links_fail_the_plan() {
    let fs = MockFileSystem::new();
    fs.add_file(
        "docs/README.md",
        ReadmeBuilder::new("Docs").include("Gone", "gone").build(),
    );

    let err = build_plan(
        &fs,
        Path::new("docs"),
        Path::new("tests/suites"),
        None,
        &default_config(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("gone"), "got {err:#}");
}

#[test]
fn write_plan_stores_every_file() -> TestResult {
    let fs = MockFileSystem::new();
    docs_tree(&fs);

    let plan = build_plan(
        &fs,
        Path::new("docs"),
        Path::new("tests/suites"),
        None,
        &default_config(),
    )?;
    write_plan(&fs, &plan)?;

    for file in &plan.files {
        assert_eq!(fs.read_to_string(&file.path)?, file.contents);
    }
    assert!(fs.is_dir(Path::new("tests/suites/advanced")));
    Ok(())
}

#[test]
fn real_filesystem_round_trip() -> TestResult {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let docs = tmp.path().join("docs");
    let out = tmp.path().join("generated");

    let fs = RealFileSystem;
    fs.write(
        &docs.join("README.md"),
        ReadmeBuilder::new("Root")
            .include("Child", "./child")
            .run("echo root")
            .build()
            .as_bytes(),
    )?;
    fs.write(
        &docs.join("child/README.md"),
        ReadmeBuilder::new("Child").run("echo child").build().as_bytes(),
    )?;

    let plan = build_plan(&fs, &docs, &out, None, &default_config())?;
    write_plan(&fs, &plan)?;

    let written = std::fs::read_to_string(out.join("mod.rs"))?;
    assert!(written.starts_with("// Code generated by testmd. DO NOT EDIT."));
    assert!(written.contains("async fn test_child("));
    assert!(!PathBuf::from(&out).join("child").exists());
    Ok(())
}
