//! Two-step process termination
//!
//! A stop request first asks the process to exit, waits a bounded grace
//! window, and only then kills it. On Unix the child must have been spawned as
//! a process group leader so the signals also reach the compiler's children.

use std::io;
use std::time::Duration;
use tokio::process::Child;

/// Phases of a stop request, walked strictly in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopPhase {
    RequestStop,
    AwaitExit,
    ForceKill,
}

/// How the process ended after a stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationReport {
    /// True when the grace window ran out and the process was killed
    pub forced: bool,
}

/// Stops `child`, escalating to a kill after `grace`
pub async fn terminate(child: &mut Child, grace: Duration) -> TerminationReport {
    let mut phase = StopPhase::RequestStop;

    loop {
        log::debug!("Termination phase: {:?}", phase);
        phase = match phase {
            StopPhase::RequestStop => {
                if let Ok(Some(status)) = child.try_wait() {
                    log::debug!("Process already exited ({}) before stop request", status);
                    return TerminationReport { forced: false };
                }
                match request_stop(child) {
                    Ok(()) => StopPhase::AwaitExit,
                    Err(e) => {
                        log::warn!("⚠️ Failed to terminate process: {}", e);
                        StopPhase::ForceKill
                    }
                }
            }
            StopPhase::AwaitExit => match tokio::time::timeout(grace, child.wait()).await {
                Ok(Ok(status)) => {
                    log::info!("Process exited after stop request ({})", status);
                    return TerminationReport { forced: false };
                }
                Ok(Err(e)) => {
                    log::warn!("Waiting for stopped process failed: {}", e);
                    StopPhase::ForceKill
                }
                Err(_) => {
                    log::warn!(
                        "Process still alive {} ms after stop request, killing it",
                        grace.as_millis()
                    );
                    StopPhase::ForceKill
                }
            },
            StopPhase::ForceKill => {
                force_kill(child).await;
                return TerminationReport { forced: true };
            }
        };
    }
}

/// Kills the process (and its group on Unix) and reaps it
pub async fn force_kill(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        if let Err(e) = signal_group(pid, libc::SIGKILL) {
            log::debug!("SIGKILL to process group {} failed: {}", pid, e);
        }
    }

    if let Err(e) = child.start_kill() {
        log::debug!("start_kill failed (process likely gone): {}", e);
    }
    if let Err(e) = child.wait().await {
        log::warn!("Failed to reap killed process: {}", e);
    }
}

#[cfg(unix)]
fn request_stop(child: &mut Child) -> io::Result<()> {
    match child.id() {
        Some(pid) => signal_group(pid, libc::SIGTERM),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn request_stop(child: &mut Child) -> io::Result<()> {
    child.start_kill()
}

/// Signals the group led by `pid`, falling back to the single process
#[cfg(unix)]
fn signal_group(pid: u32, signal: libc::c_int) -> io::Result<()> {
    let pid = pid as libc::pid_t;
    // SAFETY: kill(2) has no memory-safety preconditions
    if unsafe { libc::kill(-pid, signal) } == 0 {
        return Ok(());
    }
    if unsafe { libc::kill(pid, signal) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::process::Stdio;
    use tokio::process::Command;

    fn spawn_shell(script: &str) -> Child {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(script)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0);
        cmd.spawn().expect("Failed to spawn sh")
    }

    #[tokio::test]
    async fn test_graceful_stop() {
        let mut child = spawn_shell("sleep 30");
        let report = terminate(&mut child, Duration::from_secs(2)).await;
        assert!(!report.forced);
        assert!(child.try_wait().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_escalates_to_kill() {
        let mut child = spawn_shell("trap '' TERM; sleep 30");
        // let the shell install its trap before the stop request lands
        tokio::time::sleep(Duration::from_millis(300)).await;
        let start = std::time::Instant::now();
        let report = terminate(&mut child, Duration::from_millis(300)).await;
        assert!(report.forced);
        assert!(start.elapsed() >= Duration::from_millis(300));
        assert!(child.try_wait().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_already_exited() {
        let mut child = spawn_shell("exit 0");
        child.wait().await.unwrap();
        let report = terminate(&mut child, Duration::from_millis(100)).await;
        assert!(!report.forced);
    }
}
