//! Session lifecycle types

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one packaging run, unique per controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a run ended in failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunFailure {
    /// The process could not be launched (e.g. executable not found)
    Spawn(String),
    /// The process exited with a non-zero code
    ExitCode(i32),
    /// The process was terminated by a signal it did not get from us
    Signal(i32),
    /// Reading output or waiting for exit failed
    Io(String),
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunFailure::Spawn(msg) => write!(f, "failed to start: {}", msg),
            RunFailure::ExitCode(code) => write!(f, "exited with error code: {}", code),
            RunFailure::Signal(signal) => write!(f, "terminated by signal {}", signal),
            RunFailure::Io(msg) => write!(f, "error during execution: {}", msg),
        }
    }
}

/// Terminal state of a session, delivered exactly once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Succeeded,
    Failed(RunFailure),
    /// Stopped on request; `forced` is set when the grace window ran out
    Cancelled { forced: bool },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded)
    }

    pub fn state(&self) -> SessionState {
        match self {
            RunOutcome::Succeeded => SessionState::Succeeded,
            RunOutcome::Failed(_) => SessionState::Failed,
            RunOutcome::Cancelled { .. } => SessionState::Cancelled,
        }
    }

    /// Exit code carried by a `Failed(ExitCode)` outcome
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RunOutcome::Failed(RunFailure::ExitCode(code)) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Succeeded => write!(f, "✅ Packaging completed successfully!"),
            RunOutcome::Failed(failure) => write!(f, "❌ Packaging {}", failure),
            RunOutcome::Cancelled { forced: false } => write!(f, "🛑 Packaging stopped"),
            RunOutcome::Cancelled { forced: true } => {
                write!(f, "⚠️ Packaging process force-killed after stop request")
            }
        }
    }
}

/// Controller-level view of the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Succeeded | SessionState::Failed | SessionState::Cancelled
        )
    }

    pub fn color(&self) -> Color {
        match self {
            SessionState::Idle => Color::Gray,
            SessionState::Running => Color::Yellow,
            SessionState::Succeeded => Color::Green,
            SessionState::Failed => Color::Red,
            SessionState::Cancelled => Color::Magenta,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            SessionState::Idle => "⏸",
            SessionState::Running => "⚙️ ",
            SessionState::Succeeded => "✅",
            SessionState::Failed => "❌",
            SessionState::Cancelled => "🛑",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "Idle",
            SessionState::Running => "Running",
            SessionState::Succeeded => "Succeeded",
            SessionState::Failed => "Failed",
            SessionState::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}
