//! nuitka-forge - Nuitka packaging front end
//!
//! Turns a set of packaging options into a Nuitka command line, runs it as a
//! child process and streams its merged output back to a CLI or TUI.

pub mod builder;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use errors::*;
pub use models::*;
pub use services::{ExecutionController, ToolStatus};

/// nuitka-forge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// nuitka-forge application name
pub const APP_NAME: &str = "nuitka-forge";
