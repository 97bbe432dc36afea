//! Command builder
//!
//! Maps a `PackageOptions` snapshot onto the Nuitka argument vector. The only
//! side effects are existence checks while resolving data directories.

pub mod command;
pub mod data_dirs;
pub mod lists;

pub use command::{PLACEHOLDER_TEXT, build, is_launcher_script, preview};
pub use data_dirs::{DataDirMapping, resolve_data_dirs};
pub use lists::split_list;
