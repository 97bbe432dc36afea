//! Utility functions and helpers used throughout nuitka-forge

pub mod logging;
