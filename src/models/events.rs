//! Events passed from background work to the foreground loop

use crate::models::session::{RunOutcome, SessionId};
use crate::services::tool_check::ToolStatus;

/// Events emitted by an execution session, in the order they happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// One decoded output line of the session
    Line(SessionId, String),
    /// Terminal outcome; always the last event of the session
    Finished(SessionId, RunOutcome),
}

impl RunEvent {
    pub fn session(&self) -> SessionId {
        match self {
            RunEvent::Line(id, _) | RunEvent::Finished(id, _) => *id,
        }
    }
}

/// Non-run events consumed by the TUI loop
#[derive(Debug)]
pub enum AppEvent {
    // Tool probing
    ToolChecked(ToolStatus),

    // General events
    Tick,

    // User feedback
    Warning(String),
    Info(String),
}
