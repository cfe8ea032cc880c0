//! Shell session integration tests.
//!
//! These run against a real `/bin/sh`. Root is never required: the uid
//! probe is answered by small scripts standing in for `su`.

#![cfg(unix)]

use std::time::Duration;

use rootshell::{CommandRequest, Outcome, RootShellError, SessionSection, ShellSession};

fn sh(args: &[&str], require_root: bool) -> SessionSection {
    SessionSection {
        shell: "/bin/sh".to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
        require_root,
        probe_timeout_ms: 5000,
    }
}

#[tokio::test]
async fn test_echo_through_real_shell() {
    let mut session = ShellSession::open(&sh(&[], false)).await.unwrap();

    let mut request = CommandRequest::new("echo hello").with_timeout(Duration::from_secs(5));
    assert!(request.execute(&mut session).await);
    assert_eq!(request.standard_output(), ["hello"]);
    assert!(request.command_was_successful());

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_error_stream_through_real_shell() {
    let mut session = ShellSession::open(&sh(&[], false)).await.unwrap();

    let mut request = CommandRequest::new("ls /rootshell/definitely/missing")
        .with_timeout(Duration::from_secs(5));
    assert!(request.execute(&mut session).await);
    assert!(request.superuser_was_successful());
    assert!(!request.error_output().is_empty());
    assert_eq!(request.result().outcome(), Outcome::CommandError);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_session_state_persists_between_requests() {
    let mut session = ShellSession::open(&sh(&[], false)).await.unwrap();

    let mut cd = CommandRequest::new("cd /").with_timeout(Duration::from_millis(200));
    assert!(cd.execute(&mut session).await);
    assert!(cd.standard_output().is_empty());

    let mut pwd = CommandRequest::new("pwd").with_timeout(Duration::from_secs(5));
    assert!(pwd.execute(&mut session).await);
    assert_eq!(pwd.standard_output(), ["/"]);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_single_write_multi_line_output() {
    let mut session = ShellSession::open(&sh(&[], false)).await.unwrap();

    let mut request = CommandRequest::from_lines(["A=one", r"printf '%s\ntwo\n' $A"])
        .with_timeout(Duration::from_secs(5));
    assert!(request.execute(&mut session).await);
    assert_eq!(request.standard_output(), ["one", "two"]);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_root_probe_granted() {
    let fake_su = sh(&["-c", "read probe; echo 0; cat >/dev/null"], true);
    let session = ShellSession::open(&fake_su).await.unwrap();
    assert!(rootshell::PrivilegedSession::has_permissions(&session));
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_root_probe_refused() {
    let fake_su = sh(&["-c", "read probe; echo 1000; cat >/dev/null"], true);
    let err = ShellSession::open(&fake_su).await.unwrap_err();
    assert!(matches!(err, RootShellError::PermissionDenied));
}

#[tokio::test]
async fn test_exited_shell_faults() {
    let mut session = ShellSession::open(&sh(&[], false)).await.unwrap();

    let mut exit = CommandRequest::new("exit 0").with_timeout(Duration::from_millis(500));
    exit.execute(&mut session).await;

    // Give the process time to go away so the write hits a closed pipe.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let mut request = CommandRequest::new("echo late").with_timeout(Duration::from_millis(200));
    assert!(!request.execute(&mut session).await);
    assert!(!request.superuser_was_successful());
}
