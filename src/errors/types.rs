//! Custom error types for nuitka-forge

use std::fmt;

use crate::models::SessionId;

/// Fields that must be filled in before a command can be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Interpreter,
    EntryFile,
    OutputDir,
}

impl RequiredField {
    pub fn label(&self) -> &'static str {
        match self {
            RequiredField::Interpreter => "Python interpreter",
            RequiredField::EntryFile => "main file",
            RequiredField::OutputDir => "output directory",
        }
    }
}

/// Main error type for nuitka-forge operations
#[derive(Debug)]
pub enum ForgeError {
    /// A required option is empty; no command can be built
    MissingRequiredField(RequiredField),
    /// A packaging session is already in flight
    AlreadyRunning(SessionId),
    /// Cancel was requested with nothing running
    NotRunning,
    /// Configuration related errors
    Config(String),
    /// Tool probing errors
    Tool(String),
    /// General I/O errors
    Io(std::io::Error),
    /// Serialization errors
    Serialization(String),
}

impl fmt::Display for ForgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForgeError::MissingRequiredField(field) => {
                write!(f, "Missing required field: {}", field.label())
            }
            ForgeError::AlreadyRunning(id) => {
                write!(f, "Packaging already in progress (session {})", id)
            }
            ForgeError::NotRunning => write!(f, "No packaging session is running"),
            ForgeError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ForgeError::Tool(msg) => write!(f, "Tool error: {}", msg),
            ForgeError::Io(err) => write!(f, "I/O error: {}", err),
            ForgeError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for ForgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ForgeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ForgeError {
    fn from(err: std::io::Error) -> Self {
        ForgeError::Io(err)
    }
}

impl From<serde_json::Error> for ForgeError {
    fn from(err: serde_json::Error) -> Self {
        ForgeError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ForgeError {
    fn from(err: toml::de::Error) -> Self {
        ForgeError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ForgeError {
    fn from(err: toml::ser::Error) -> Self {
        ForgeError::Serialization(err.to_string())
    }
}

/// Result type alias for nuitka-forge operations
pub type Result<T> = std::result::Result<T, ForgeError>;
