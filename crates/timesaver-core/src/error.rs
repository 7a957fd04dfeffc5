//! Error types for timesaver-core

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using timesaver-core's error type
pub type Result<T> = std::result::Result<T, ScaffoldError>;

/// Everything that can abort an orchestration run
#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// External command could not be spawned, exited non-zero, or (in strict
    /// mode) wrote to stderr
    #[error("command `{command}` failed{}: {message}", exit_suffix(.code))]
    Command {
        command: String,
        code: Option<i32>,
        message: String,
    },

    /// Missing path, permission problem, or failed rename
    #[error("filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest could not be read, parsed, or written
    #[error("manifest error at {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    /// A polled path never appeared
    #[error("timed out after {waited:?} waiting for {path} to appear")]
    Timeout { path: PathBuf, waited: Duration },

    /// User-supplied project details are unusable
    #[error("invalid project request: {0}")]
    InvalidRequest(String),

    /// Settings file or environment override is malformed
    #[error("invalid configuration from {source_name}: {reason}")]
    Config { source_name: String, reason: String },

    /// Required external tools are not on PATH
    #[error("missing required tools:\n{}", bullet_list(.0))]
    MissingTools(Vec<String>),
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {}", code),
        None => String::new(),
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("  - {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ScaffoldError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn manifest(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Manifest {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
