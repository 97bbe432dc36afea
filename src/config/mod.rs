//! Configuration management for nuitka-forge

pub mod app_config;
pub mod options_file;

pub use app_config::*;
pub use options_file::*;
