//! Setup-time errors (settings and map loading).
//!
//! The frame path never returns these: rendering degrades instead of failing.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("map error at line {line}: {message}")]
    Map { line: usize, message: String },

    #[error("invalid settings: {message}")]
    Config { message: String },

    #[error("required path does not exist: {path}")]
    MissingPath { path: PathBuf },
}

impl EngineError {
    #[must_use]
    pub fn map(line: usize, message: impl Into<String>) -> Self {
        Self::Map {
            line,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
