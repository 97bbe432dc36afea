//! Execution controller for packaging runs
//!
//! The controller owns at most one `ExecutionSession`. Each session runs on a
//! tokio task that exclusively owns the child process, plus one OS thread that
//! performs the blocking line reads. Everything the foreground needs to know
//! arrives as `RunEvent`s on the channel passed to [`ExecutionController::start`]:
//! output lines in order, then exactly one `Finished`.

use std::io::{self, BufRead, BufReader, PipeReader};
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::errors::{ForgeError, Result};
use crate::models::{CommandLine, RunEvent, RunFailure, RunOutcome, SessionId, SessionState};
use crate::services::termination;

/// Grace window between a stop request and a forced kill
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(2000);

/// State shared between the controller and a session's worker
#[derive(Default)]
struct SessionShared {
    stop_requested: AtomicBool,
    outcome: OnceLock<RunOutcome>,
    /// Held while accepting a stop request or recording the outcome
    decision: Mutex<()>,
}

impl SessionShared {
    fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    fn decide(&self) -> MutexGuard<'_, ()> {
        self.decision.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One tracked run of the external compiler
pub struct ExecutionSession {
    id: SessionId,
    command: CommandLine,
    shared: Arc<SessionShared>,
    cancel_tx: watch::Sender<bool>,
    worker: JoinHandle<()>,
}

impl ExecutionSession {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn command(&self) -> &CommandLine {
        &self.command
    }

    pub fn is_running(&self) -> bool {
        self.shared.outcome.get().is_none()
    }

    pub fn state(&self) -> SessionState {
        self.shared
            .outcome
            .get()
            .map(RunOutcome::state)
            .unwrap_or(SessionState::Running)
    }

    pub fn outcome(&self) -> Option<&RunOutcome> {
        self.shared.outcome.get()
    }
}

/// Starts, tracks and cancels packaging runs, one at a time
pub struct ExecutionController {
    grace_period: Duration,
    next_id: u64,
    current: Option<ExecutionSession>,
}

impl Default for ExecutionController {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE_PERIOD)
    }
}

impl ExecutionController {
    pub fn new(grace_period: Duration) -> Self {
        Self {
            grace_period,
            next_id: 0,
            current: None,
        }
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Launches `command` on a background worker
    ///
    /// Must be called from within a tokio runtime. Returns `AlreadyRunning`
    /// without touching the active session if one is still running.
    pub fn start(
        &mut self,
        command: CommandLine,
        events: mpsc::UnboundedSender<RunEvent>,
    ) -> Result<SessionId> {
        if let Some(session) = &self.current {
            if session.is_running() {
                log::warn!("⚠️ Packaging already in progress ({})", session.id);
                return Err(ForgeError::AlreadyRunning(session.id));
            }
        }

        self.next_id += 1;
        let id = SessionId(self.next_id);
        log::info!("Starting packaging command {}: {}", id, command);

        let shared = Arc::new(SessionShared::default());
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let worker = Worker {
            id,
            command: command.clone(),
            shared: Arc::clone(&shared),
            cancel_rx,
            events,
            grace_period: self.grace_period,
        };

        self.current = Some(ExecutionSession {
            id,
            command,
            shared,
            cancel_tx,
            worker: tokio::spawn(worker.run()),
        });
        Ok(id)
    }

    /// Requests a stop of the running session
    ///
    /// Output read after this call is discarded. Once this returns `Ok`, the
    /// session reports `Cancelled`, even if the process exits on its own first.
    pub fn cancel(&mut self) -> Result<()> {
        let session = self.current.as_ref().ok_or(ForgeError::NotRunning)?;

        let _decision = session.shared.decide();
        if !session.is_running() {
            return Err(ForgeError::NotRunning);
        }
        session.shared.stop_requested.store(true, Ordering::SeqCst);
        // the worker may finish concurrently and drop its receiver
        let _ = session.cancel_tx.send(true);
        log::info!("🛑 User requested packaging stop ({})", session.id);
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.current
            .as_ref()
            .map(ExecutionSession::state)
            .unwrap_or(SessionState::Idle)
    }

    pub fn is_running(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(ExecutionSession::is_running)
    }

    pub fn current(&self) -> Option<&ExecutionSession> {
        self.current.as_ref()
    }

    /// Command of the current session, finished or not
    pub fn current_command(&self) -> Option<&CommandLine> {
        self.current.as_ref().map(ExecutionSession::command)
    }

    /// Releases a finished session and returns its outcome
    pub fn discard_finished(&mut self) -> Option<RunOutcome> {
        if self.is_running() {
            return None;
        }
        let session = self.current.take()?;
        session.shared.outcome.get().cloned()
    }

    /// Cancels any running session and waits for its worker to finish
    pub async fn shutdown(&mut self) {
        if self.is_running() {
            let _ = self.cancel();
        }
        if let Some(session) = self.current.take() {
            if let Err(e) = session.worker.await {
                log::error!("Packaging worker for {} panicked: {}", session.id, e);
            }
        }
    }
}

/// Background half of a session
struct Worker {
    id: SessionId,
    command: CommandLine,
    shared: Arc<SessionShared>,
    cancel_rx: watch::Receiver<bool>,
    events: mpsc::UnboundedSender<RunEvent>,
    grace_period: Duration,
}

impl Worker {
    async fn run(mut self) {
        let driven = match self.drive().await {
            Ok(outcome) => outcome,
            Err(failure) => RunOutcome::Failed(failure),
        };

        // Record before notifying so a listener can start the next run at once
        let outcome = {
            let _decision = self.shared.decide();
            let outcome = settle_outcome(driven, self.shared.stop_requested());
            let _ = self.shared.outcome.set(outcome.clone());
            outcome
        };

        match &outcome {
            RunOutcome::Succeeded => log::info!("Packaging {} completed successfully", self.id),
            RunOutcome::Failed(failure) => log::error!("Packaging {} {}", self.id, failure),
            RunOutcome::Cancelled { forced } => {
                log::info!("Packaging {} cancelled (forced: {})", self.id, forced)
            }
        }

        if self.events.send(RunEvent::Finished(self.id, outcome)).is_err() {
            log::debug!("No listener for the end of {}", self.id);
        }
    }

    async fn drive(&mut self) -> std::result::Result<RunOutcome, RunFailure> {
        let (mut child, mut lines) = spawn_child(&self.command)?;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel_rx.changed() => return Ok(self.stop(&mut child).await),
                next = lines.recv() => match next {
                    Some(Ok(line)) => self.emit_line(line),
                    Some(Err(e)) => {
                        termination::force_kill(&mut child).await;
                        return Err(RunFailure::Io(e.to_string()));
                    }
                    None => break,
                },
            }
        }

        let status = tokio::select! {
            biased;
            _ = self.cancel_rx.changed() => return Ok(self.stop(&mut child).await),
            status = child.wait() => status.map_err(|e| RunFailure::Io(e.to_string()))?,
        };

        Ok(outcome_from_status(status))
    }

    fn emit_line(&self, line: String) {
        if self.shared.stop_requested() {
            return;
        }
        let _ = self.events.send(RunEvent::Line(self.id, line));
    }

    async fn stop(&self, child: &mut Child) -> RunOutcome {
        let report = termination::terminate(child, self.grace_period).await;
        RunOutcome::Cancelled {
            forced: report.forced,
        }
    }
}

type LineReceiver = mpsc::UnboundedReceiver<io::Result<String>>;

/// Spawns the process with stdout and stderr sharing one pipe
fn spawn_child(command: &CommandLine) -> std::result::Result<(Child, LineReceiver), RunFailure> {
    let (reader, writer) = io::pipe()
        .map_err(|e| RunFailure::Spawn(format!("failed to create output pipe: {}", e)))?;
    let writer_err = writer
        .try_clone()
        .map_err(|e| RunFailure::Spawn(format!("failed to create output pipe: {}", e)))?;

    let mut cmd = Command::new(command.program());
    cmd.args(command.args())
        .env("PYTHONUNBUFFERED", "1")
        .stdin(Stdio::null())
        .stdout(writer)
        .stderr(writer_err)
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let child = cmd
        .spawn()
        .map_err(|e| RunFailure::Spawn(format!("{}: {}", command.program(), e)))?;
    // The parent's copies of the write end live in `cmd`; EOF needs them closed
    drop(cmd);

    let (line_tx, line_rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("nuitka-output".to_string())
        .spawn(move || pump_lines(reader, line_tx))
        .map_err(|e| RunFailure::Io(format!("failed to start output reader: {}", e)))?;

    Ok((child, line_rx))
}

/// Blocking reader loop; ends at EOF, on a read error, or when nobody listens
fn pump_lines(reader: PipeReader, tx: mpsc::UnboundedSender<io::Result<String>>) {
    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::new();

    loop {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer) {
            Ok(0) => break,
            Ok(_) => {
                if tx.send(Ok(decode_line(&buffer))).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                let _ = tx.send(Err(e));
                break;
            }
        }
    }
}

/// Decodes one raw line, replacing invalid UTF-8 and dropping the line ending
pub(crate) fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// An accepted stop request wins over however the process happened to end
fn settle_outcome(outcome: RunOutcome, stop_requested: bool) -> RunOutcome {
    match outcome {
        RunOutcome::Cancelled { .. } => outcome,
        _ if stop_requested => RunOutcome::Cancelled { forced: false },
        _ => outcome,
    }
}

fn outcome_from_status(status: ExitStatus) -> RunOutcome {
    if status.success() {
        return RunOutcome::Succeeded;
    }
    if let Some(code) = status.code() {
        return RunOutcome::Failed(RunFailure::ExitCode(code));
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return RunOutcome::Failed(RunFailure::Signal(signal));
        }
    }
    RunOutcome::Failed(RunFailure::Io(format!("process ended abnormally: {}", status)))
}
