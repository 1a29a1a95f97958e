use std::error::Error;
use std::path::Path;
use std::time::Duration;

use testmd::config::RunnerConfig;
use testmd::errors::TestmdError;
use testmd::exec::RetryError;
use testmd::harness::Suite;
use testmd_test_utils::{bash_available, init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn quick_config(base: &Path) -> RunnerConfig {
    RunnerConfig {
        timeout: Duration::from_millis(300),
        poll_interval: Duration::from_millis(50),
        shell: "bash".to_string(),
        base_dir: Some(base.to_path_buf()),
    }
}

fn read_log(base: &Path) -> String {
    std::fs::read_to_string(base.join("order.log")).unwrap_or_default()
}

#[tokio::test]
async fn cleanups_run_in_reverse_registration_order() -> TestResult {
    init_tracing();
    if !bash_available() {
        return Ok(());
    }

    let dir = tempfile::tempdir()?;
    let mut suite = Suite::new(quick_config(dir.path()));

    let scope = suite.begin_scope();
    let r = suite.runner(".")?;
    suite.cleanup(r, &["echo first >> order.log"]);
    suite.cleanup(r, &["echo second >> order.log", "echo third >> order.log"]);
    with_timeout(suite.run(r, "touch order.log")).await?;
    assert_eq!(read_log(dir.path()), "");

    with_timeout(suite.end_scope(scope)).await?;
    assert_eq!(read_log(dir.path()), "second\nthird\nfirst\n");
    Ok(())
}

#[tokio::test]
async fn inner_scope_unwinds_before_outer() -> TestResult {
    init_tracing();
    if !bash_available() {
        return Ok(());
    }

    let dir = tempfile::tempdir()?;
    let mut suite = Suite::new(quick_config(dir.path()));

    let outer = suite.runner(".")?;
    suite.cleanup(outer, &["echo outer >> order.log"]);

    let scope = suite.begin_scope();
    let inner = suite.runner(".")?;
    suite.cleanup(inner, &["echo inner >> order.log"]);
    with_timeout(suite.end_scope(scope)).await?;
    assert_eq!(read_log(dir.path()), "inner\n");

    // The inner runner is gone, the outer one still works.
    let err = suite.run(inner, "true").await.unwrap_err();
    assert!(matches!(err, TestmdError::UnknownRunner(_)));
    with_timeout(suite.run(outer, "true")).await?;

    with_timeout(suite.teardown()).await?;
    assert_eq!(read_log(dir.path()), "inner\nouter\n");
    Ok(())
}

#[tokio::test]
async fn failing_command_reports_deadline() -> TestResult {
    init_tracing();
    if !bash_available() {
        return Ok(());
    }

    let dir = tempfile::tempdir()?;
    let mut suite = Suite::new(quick_config(dir.path()));
    let r = suite.runner(".")?;

    let err = with_timeout(suite.run(r, "test -f missing.txt"))
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            TestmdError::Retry(RetryError::DeadlineExceeded { exit_code: 1, .. })
        ),
        "got {err:?}"
    );

    with_timeout(suite.teardown()).await?;
    Ok(())
}

#[tokio::test]
async fn failed_cleanup_does_not_stop_the_others() -> TestResult {
    init_tracing();
    if !bash_available() {
        return Ok(());
    }

    let dir = tempfile::tempdir()?;
    let mut suite = Suite::new(quick_config(dir.path()));
    let r = suite.runner(".")?;
    suite.cleanup(r, &["echo survived >> order.log"]);
    suite.cleanup(r, &["false", "echo skipped >> order.log"]);

    let err = with_timeout(suite.teardown()).await.unwrap_err();
    assert!(matches!(err, TestmdError::Retry(_)), "got {err:?}");
    assert_eq!(read_log(dir.path()), "survived\n");
    Ok(())
}

#[tokio::test]
async fn retries_until_a_file_appears() -> TestResult {
    init_tracing();
    if !bash_available() {
        return Ok(());
    }

    let dir = tempfile::tempdir()?;
    let mut config = quick_config(dir.path());
    config.timeout = Duration::from_secs(5);
    let mut suite = Suite::new(config);

    let r = suite.runner(".")?;
    with_timeout(suite.run(r, "(sleep 0.3 && touch ready.flag) &")).await?;
    let res = with_timeout(suite.run(r, "test -f ready.flag && echo ready")).await?;
    assert_eq!(res.stdout, "ready");

    with_timeout(suite.teardown()).await?;
    Ok(())
}
