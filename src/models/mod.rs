//! Data models and types used throughout nuitka-forge

pub mod command;
pub mod events;
pub mod options;
pub mod session;

// Re-export commonly used types
pub use command::*;
pub use events::*;
pub use options::*;
pub use session::*;
