//! Services module containing the process-facing functionality
//!
//! The execution controller and tool probe are shared by the CLI commands
//! and the TUI so both front ends run Nuitka the same way.

pub mod execution;
pub mod termination;
pub mod tool_check;

pub use execution::*;
pub use termination::{StopPhase, TerminationReport};
pub use tool_check::{DetectionMethod, ToolStatus, find_system_python, probe_nuitka};
