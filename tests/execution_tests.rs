//! Execution controller integration tests
//!
//! Runs small shell scripts in place of Nuitka to exercise output streaming,
//! outcome reporting and the stop sequence.

#![cfg(unix)]

use nuitka_forge::errors::ForgeError;
use nuitka_forge::models::{CommandLine, RunEvent, RunFailure, RunOutcome, SessionState};
use nuitka_forge::services::ExecutionController;
use std::time::Duration;
use tokio::sync::mpsc;

const EVENT_TIMEOUT: Duration = Duration::from_secs(15);

fn shell(script: &str) -> CommandLine {
    CommandLine::from_tokens(vec!["sh".to_string(), "-c".to_string(), script.to_string()])
        .unwrap()
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<RunEvent>) -> Option<RunEvent> {
    tokio::time::timeout(EVENT_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for a run event")
}

/// Collects lines until the terminal event, then checks nothing follows it
async fn collect(rx: &mut mpsc::UnboundedReceiver<RunEvent>) -> (Vec<String>, RunOutcome) {
    let mut lines = Vec::new();
    loop {
        match next_event(rx).await {
            Some(RunEvent::Line(_, line)) => lines.push(line),
            Some(RunEvent::Finished(_, outcome)) => {
                assert!(next_event(rx).await.is_none(), "event after Finished");
                return (lines, outcome);
            }
            None => panic!("channel closed without Finished"),
        }
    }
}

async fn wait_for_line(rx: &mut mpsc::UnboundedReceiver<RunEvent>, wanted: &str) {
    loop {
        match next_event(rx).await {
            Some(RunEvent::Line(_, line)) if line == wanted => return,
            Some(RunEvent::Line(..)) => {}
            other => panic!("expected line {:?}, got {:?}", wanted, other),
        }
    }
}

#[tokio::test]
async fn test_lines_then_success() {
    let mut controller = ExecutionController::default();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let id = controller
        .start(shell("echo one; echo two 1>&2; echo '  three'"), tx)
        .unwrap();

    let (lines, outcome) = collect(&mut rx).await;
    assert_eq!(lines, ["one", "two", "  three"]);
    assert_eq!(outcome, RunOutcome::Succeeded);
    assert_eq!(controller.state(), SessionState::Succeeded);
    assert_eq!(controller.current().map(|s| s.id()), Some(id));
    assert_eq!(controller.current_command().map(|c| c.program()), Some("sh"));
}

#[tokio::test]
async fn test_non_zero_exit() {
    let mut controller = ExecutionController::default();
    let (tx, mut rx) = mpsc::unbounded_channel();

    controller
        .start(shell("echo 'Nuitka:ERROR: something broke' >&2; exit 2"), tx)
        .unwrap();

    let (lines, outcome) = collect(&mut rx).await;
    assert_eq!(lines, ["Nuitka:ERROR: something broke"]);
    assert_eq!(outcome, RunOutcome::Failed(RunFailure::ExitCode(2)));
    assert_eq!(outcome.exit_code(), Some(2));
    assert_eq!(controller.state(), SessionState::Failed);
}

#[tokio::test]
async fn test_missing_executable() {
    let mut controller = ExecutionController::default();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let command = CommandLine::new("/nonexistent/forge-test/python3");
    controller.start(command, tx).unwrap();

    let (lines, outcome) = collect(&mut rx).await;
    assert!(lines.is_empty());
    assert!(matches!(outcome, RunOutcome::Failed(RunFailure::Spawn(_))));
}

#[tokio::test]
async fn test_cancel_reports_once() {
    let mut controller = ExecutionController::default();
    let (tx, mut rx) = mpsc::unbounded_channel();

    controller
        .start(shell("while true; do echo tick; sleep 0.05; done"), tx)
        .unwrap();
    wait_for_line(&mut rx, "tick").await;

    controller.cancel().unwrap();
    // A second request while stopping is harmless
    let _ = controller.cancel();

    let (_, outcome) = collect(&mut rx).await;
    assert_eq!(outcome, RunOutcome::Cancelled { forced: false });
    assert_eq!(controller.state(), SessionState::Cancelled);
    assert!(matches!(controller.cancel(), Err(ForgeError::NotRunning)));
}

#[tokio::test]
async fn test_no_lines_after_cancel() {
    let mut controller = ExecutionController::default();
    let (tx, mut rx) = mpsc::unbounded_channel();

    controller.start(shell("yes line"), tx).unwrap();
    wait_for_line(&mut rx, "line").await;
    controller.cancel().unwrap();

    // Whatever was queued before the request is fine to drop
    let mut finished = None;
    while let Ok(event) = rx.try_recv() {
        if let RunEvent::Finished(_, outcome) = event {
            finished = Some(outcome);
            break;
        }
    }

    let (late, outcome) = match finished {
        Some(outcome) => (Vec::new(), outcome),
        None => collect(&mut rx).await,
    };
    assert!(
        late.len() <= 1,
        "{} lines arrived after the stop request",
        late.len()
    );
    assert_eq!(outcome, RunOutcome::Cancelled { forced: false });
}

#[tokio::test]
async fn test_accepted_cancel_always_reports_cancelled() {
    for attempt in 0..20u64 {
        let mut controller = ExecutionController::default();
        let (tx, mut rx) = mpsc::unbounded_channel();

        controller.start(shell("true"), tx).unwrap();
        // Vary the delay so the request lands before, during and after exit
        tokio::time::sleep(Duration::from_micros(attempt * 250)).await;
        let accepted = controller.cancel();

        let (_, outcome) = collect(&mut rx).await;
        match accepted {
            Ok(()) => assert_eq!(outcome, RunOutcome::Cancelled { forced: false }),
            Err(ForgeError::NotRunning) => assert_eq!(outcome, RunOutcome::Succeeded),
            Err(e) => panic!("unexpected cancel error: {}", e),
        }
        assert_eq!(controller.state(), outcome.state());
    }
}

#[tokio::test]
async fn test_second_start_rejected_while_running() {
    let mut controller = ExecutionController::default();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let id = controller
        .start(shell("echo ready; sleep 30"), tx.clone())
        .unwrap();
    wait_for_line(&mut rx, "ready").await;

    match controller.start(shell("echo second"), tx) {
        Err(ForgeError::AlreadyRunning(running)) => assert_eq!(running, id),
        other => panic!("Expected AlreadyRunning, got {:?}", other.map(|_| ())),
    }
    assert!(controller.is_running());
    assert_eq!(controller.current().map(|s| s.id()), Some(id));

    controller.shutdown().await;
    assert_eq!(controller.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_stop_escalates_to_kill() {
    let mut controller = ExecutionController::new(Duration::from_millis(300));
    let (tx, mut rx) = mpsc::unbounded_channel();

    // SIG_IGN survives exec, so `sleep` ignores TERM as well
    controller
        .start(shell("trap '' TERM; echo ready; sleep 30"), tx)
        .unwrap();
    wait_for_line(&mut rx, "ready").await;

    controller.cancel().unwrap();
    let (_, outcome) = collect(&mut rx).await;
    assert_eq!(outcome, RunOutcome::Cancelled { forced: true });
}

#[tokio::test]
async fn test_invalid_utf8_and_partial_line() {
    let mut controller = ExecutionController::default();
    let (tx, mut rx) = mpsc::unbounded_channel();

    controller
        .start(shell(r"printf 'bad \377 byte\r\n'; printf 'no newline'"), tx)
        .unwrap();

    let (lines, outcome) = collect(&mut rx).await;
    assert_eq!(lines, ["bad \u{FFFD} byte", "no newline"]);
    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_restart_right_after_finish() {
    let mut controller = ExecutionController::default();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let first = controller.start(shell("echo first"), tx.clone()).unwrap();
    let (_, outcome) = collect_until_finished(&mut rx).await;
    assert!(outcome.is_success());

    // The outcome is recorded before Finished is sent
    let second = controller.start(shell("echo second"), tx).unwrap();
    assert!(second > first);

    let (lines, outcome) = collect_until_finished(&mut rx).await;
    assert_eq!(lines, ["second"]);
    assert!(outcome.is_success());
    assert_eq!(controller.discard_finished(), Some(RunOutcome::Succeeded));
    assert_eq!(controller.state(), SessionState::Idle);
}

/// Like `collect`, for channels whose sender is still held by the test
async fn collect_until_finished(
    rx: &mut mpsc::UnboundedReceiver<RunEvent>,
) -> (Vec<String>, RunOutcome) {
    let mut lines = Vec::new();
    loop {
        match next_event(rx).await {
            Some(RunEvent::Line(_, line)) => lines.push(line),
            Some(RunEvent::Finished(_, outcome)) => return (lines, outcome),
            None => panic!("channel closed without Finished"),
        }
    }
}
