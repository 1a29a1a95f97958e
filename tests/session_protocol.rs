use std::error::Error;

use rand::Rng;
use rand::distributions::Alphanumeric;

use testmd::exec::{Session, SessionOptions};
use testmd_test_utils::{bash_available, init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn reports_stdout_stderr_and_exit_code() -> TestResult {
    init_tracing();
    if !bash_available() {
        return Ok(());
    }

    let mut session = Session::open(SessionOptions::default())?;

    let ok = with_timeout(session.run("echo hello")).await?;
    assert_eq!(ok.stdout, "hello");
    assert_eq!(ok.stderr, "");
    assert_eq!(ok.exit_code, 0);
    assert!(ok.success());

    let failed = with_timeout(session.run("echo oops >&2; false")).await?;
    assert_eq!(failed.stdout, "");
    assert_eq!(failed.stderr, "oops");
    assert_eq!(failed.exit_code, 1);

    let custom = with_timeout(session.run("(exit 42)")).await?;
    assert_eq!(custom.exit_code, 42);

    let substituted = with_timeout(session.run("$(exit 42)")).await?;
    assert_eq!(substituted.exit_code, 42);
    assert_eq!(substituted.stdout, "");

    session.close().await?;
    Ok(())
}

#[tokio::test]
async fn shell_state_persists_between_commands() -> TestResult {
    init_tracing();
    if !bash_available() {
        return Ok(());
    }

    let mut session = Session::open(SessionOptions::default())?;

    with_timeout(session.run("export TESTMD_GREETING=persisted")).await?;
    let res = with_timeout(session.run("echo $TESTMD_GREETING")).await?;
    assert_eq!(res.stdout, "persisted");

    session.close().await?;
    Ok(())
}

#[tokio::test]
async fn multi_line_output_is_trimmed_not_joined() -> TestResult {
    init_tracing();
    if !bash_available() {
        return Ok(());
    }

    let mut session = Session::open(SessionOptions::default())?;

    let res = with_timeout(session.run("printf '  a\\nb\\n\\n'")).await?;
    assert_eq!(res.stdout, "a\nb");

    let empty = with_timeout(session.run("true")).await?;
    assert_eq!(empty.stdout, "");
    assert_eq!(empty.exit_code, 0);

    session.close().await?;
    Ok(())
}

#[tokio::test]
async fn large_output_survives_buffer_growth() -> TestResult {
    init_tracing();
    if !bash_available() {
        return Ok(());
    }

    let payload: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64 * 1024)
        .map(char::from)
        .collect();

    let mut session = Session::open(SessionOptions::default())?;
    let res = with_timeout(session.run(&format!("printf '%s' {payload}"))).await?;
    assert_eq!(res.stdout.len(), payload.len());
    assert_eq!(res.stdout, payload);

    session.close().await?;
    Ok(())
}

#[tokio::test]
async fn consecutive_commands_get_their_own_output() -> TestResult {
    init_tracing();
    if !bash_available() {
        return Ok(());
    }

    let mut session = Session::open(SessionOptions::default())?;
    for i in 0..20 {
        let res = with_timeout(session.run(&format!("echo out-{i}; echo err-{i} >&2"))).await?;
        assert_eq!(res.stdout, format!("out-{i}"));
        assert_eq!(res.stderr, format!("err-{i}"));
    }

    session.close().await?;
    Ok(())
}

#[tokio::test]
async fn unknown_command_reports_not_found() -> TestResult {
    init_tracing();
    if !bash_available() {
        return Ok(());
    }

    let mut session = Session::open(SessionOptions::default())?;
    let res = with_timeout(session.run("testmd-no-such-command --flag")).await?;
    assert_ne!(res.exit_code, 0);
    assert_eq!(res.stdout, "");
    assert!(res.stderr.contains("command not found"), "stderr: {}", res.stderr);

    // The session is still usable afterwards.
    let res = with_timeout(session.run("echo still-here")).await?;
    assert_eq!(res.stdout, "still-here");

    session.close().await?;
    Ok(())
}

#[tokio::test]
async fn multi_line_command_splits_streams() -> TestResult {
    init_tracing();
    if !bash_available() {
        return Ok(());
    }

    let mut session = Session::open(SessionOptions::default())?;
    let res = with_timeout(session.run("echo out\necho err >&2")).await?;
    assert_eq!(res.stdout, "out");
    assert_eq!(res.stderr, "err");
    assert_eq!(res.exit_code, 0);

    session.close().await?;
    Ok(())
}

#[tokio::test]
async fn many_random_lines_round_trip_on_both_streams() -> TestResult {
    init_tracing();
    if !bash_available() {
        return Ok(());
    }

    const LINES: usize = 2000;
    const WIDTH: usize = 100;

    let text = {
        let mut rng = rand::thread_rng();
        let mut text = String::with_capacity(LINES * (WIDTH + 1));
        for _ in 0..LINES {
            text.extend((&mut rng).sample_iter(&Alphanumeric).take(WIDTH).map(char::from));
            text.push('\n');
        }
        text
    };
    let expected = text.strip_suffix('\n').unwrap_or(&text);

    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("lines.txt"), &text)?;
    let mut session = Session::open(SessionOptions::default().with_dir(dir.path()))?;

    let out = with_timeout(session.run("cat lines.txt")).await?;
    assert_eq!(out.stdout.len(), expected.len());
    assert_eq!(out.stdout, expected);

    let err = with_timeout(session.run("cat lines.txt >&2")).await?;
    assert_eq!(err.stdout, "");
    assert_eq!(err.stderr.len(), expected.len());
    assert_eq!(err.stderr, expected);

    session.close().await?;
    Ok(())
}
