//! Working-directory management
//!
//! All operations take explicit paths; nothing here reads or changes the
//! process's current directory.

use crate::error::{Result, ScaffoldError};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Directories left out of [`count_files`]
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

/// How long and how often to poll for a path created by an external tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Remove `path` if present and recreate it empty.
///
/// Any existing content is destroyed without confirmation.
pub async fn reset_directory(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path).await {
        Ok(meta) if meta.is_dir() => {
            info!("Removing existing directory {}", path.display());
            fs::remove_dir_all(path)
                .await
                .map_err(|e| ScaffoldError::fs(path, e))?;
        }
        Ok(_) => {
            info!("Removing existing file {}", path.display());
            fs::remove_file(path)
                .await
                .map_err(|e| ScaffoldError::fs(path, e))?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(ScaffoldError::fs(path, e)),
    }

    fs::create_dir_all(path)
        .await
        .map_err(|e| ScaffoldError::fs(path, e))?;
    debug!("Created fresh directory {}", path.display());
    Ok(())
}

/// Suspend until `path` exists, polling at `policy.interval`.
///
/// A path that does not exist yet is not an error; only running past
/// `policy.timeout` is.
pub async fn await_path(path: &Path, policy: &WaitPolicy) -> Result<()> {
    let started = Instant::now();
    debug!("Waiting for {} to appear", path.display());

    loop {
        if fs::try_exists(path).await.unwrap_or(false) {
            debug!(
                "{} appeared after {}ms",
                path.display(),
                started.elapsed().as_millis()
            );
            return Ok(());
        }

        let waited = started.elapsed();
        if waited >= policy.timeout {
            return Err(ScaffoldError::Timeout {
                path: path.to_path_buf(),
                waited,
            });
        }

        let remaining = policy.timeout - waited;
        tokio::time::sleep(policy.interval.min(remaining)).await;
    }
}

/// Suspend until the directory at `path` exists
pub async fn await_directory(path: &Path, policy: &WaitPolicy) -> Result<()> {
    await_path(path, policy).await
}

/// Rename a directory, refusing to overwrite an existing target
pub async fn rename_directory(from: &Path, to: &Path) -> Result<()> {
    if !fs::try_exists(from).await.unwrap_or(false) {
        return Err(ScaffoldError::fs(
            from,
            std::io::Error::new(std::io::ErrorKind::NotFound, "source does not exist"),
        ));
    }
    if fs::try_exists(to).await.unwrap_or(false) && !same_entry(from, to).await {
        return Err(ScaffoldError::fs(
            to,
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "target already exists"),
        ));
    }

    fs::rename(from, to)
        .await
        .map_err(|e| ScaffoldError::fs(to, e))?;
    info!("Renamed {} to {}", from.display(), to.display());
    Ok(())
}

/// Whether both paths resolve to one directory entry, as a case-only rename
/// does on a case-insensitive filesystem
async fn same_entry(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a).await, fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Count files under `root`, skipping dependency and VCS directories
pub fn count_files(root: &Path) -> usize {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| SKIPPED_DIRS.contains(&name)))
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .count()
}

/// Resolve a possibly relative working root against `base`
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
