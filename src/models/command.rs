//! Command line produced by the builder

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered token sequence: the program to execute followed by its arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandLine {
    tokens: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            tokens: vec![program.into()],
        }
    }

    /// Returns `None` for an empty token list, which has no program to run
    pub fn from_tokens(tokens: Vec<String>) -> Option<Self> {
        if tokens.is_empty() {
            None
        } else {
            Some(Self { tokens })
        }
    }

    pub fn arg(&mut self, token: impl Into<String>) -> &mut Self {
        self.tokens.push(token.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Index of the first token equal to `token`
    pub fn position(&self, token: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t == token)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if token.is_empty() || token.chars().any(char::is_whitespace) {
                write!(f, "\"{}\"", token)?;
            } else {
                f.write_str(token)?;
            }
        }
        Ok(())
    }
}
