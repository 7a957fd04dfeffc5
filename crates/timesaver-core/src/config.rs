//! Runtime settings
//!
//! Resolution order: built-in defaults, then an optional YAML file, then
//! `TIMESAVER_*` environment variables. The CLI applies `--root` last.

use crate::error::{Result, ScaffoldError};
use crate::workspace::WaitPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable overriding the working root
pub const ROOT_ENV: &str = "TIMESAVER_ROOT";
/// Environment variable overriding the directory-wait timeout (seconds)
pub const AWAIT_TIMEOUT_ENV: &str = "TIMESAVER_AWAIT_TIMEOUT_SECS";
/// Environment variable overriding the directory-wait poll interval (milliseconds)
pub const POLL_INTERVAL_ENV: &str = "TIMESAVER_POLL_INTERVAL_MS";
/// Environment variable enabling strict stderr handling
pub const STRICT_STDERR_ENV: &str = "TIMESAVER_STRICT_STDERR";

/// Default working root, relative to the invocation directory
pub const DEFAULT_ROOT: &str = "Project";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory recreated for every run; scaffolders run inside it
    pub working_root: PathBuf,
    pub poll_interval_ms: u64,
    pub await_timeout_secs: u64,
    /// Fail commands that write to stderr even when they exit successfully
    pub strict_stderr: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            working_root: PathBuf::from(DEFAULT_ROOT),
            poll_interval_ms: 100,
            await_timeout_secs: 300,
            strict_stderr: false,
        }
    }
}

impl Settings {
    /// Load settings from an optional YAML file plus the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Parse a YAML settings file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ScaffoldError::Config {
            source_name: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            ScaffoldError::Config { reason, .. } => ScaffoldError::Config {
                source_name: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ScaffoldError::Config {
            source_name: "settings".to_string(),
            reason: e.to_string(),
        })
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(root) = lookup(ROOT_ENV).filter(|v| !v.trim().is_empty()) {
            self.working_root = PathBuf::from(root);
        }
        if let Some(value) = lookup(AWAIT_TIMEOUT_ENV) {
            self.await_timeout_secs = parse_env(AWAIT_TIMEOUT_ENV, &value)?;
        }
        if let Some(value) = lookup(POLL_INTERVAL_ENV) {
            self.poll_interval_ms = parse_env(POLL_INTERVAL_ENV, &value)?;
        }
        if let Some(value) = lookup(STRICT_STDERR_ENV) {
            self.strict_stderr = parse_flag(STRICT_STDERR_ENV, &value)?;
        }
        Ok(())
    }

    /// Polling policy for paths created by scaffolders
    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            timeout: Duration::from_secs(self.await_timeout_secs),
        }
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ScaffoldError::Config {
        source_name: key.to_string(),
        reason: format!("'{}': {}", value, e),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ScaffoldError::Config {
            source_name: key.to_string(),
            reason: format!("'{}' is not a boolean", value),
        }),
    }
}
