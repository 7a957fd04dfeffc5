//! External command execution
//!
//! Every scaffolder and package-manager call goes through a [`CommandRunner`].
//! The production implementation spawns one shell per command line and drains
//! both pipes while the child runs; tests substitute a fake that simulates the
//! scaffolders.

use crate::error::{Result, ScaffoldError};
use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tracing::{debug, info, warn};

/// Number of trailing stderr lines kept in a failure message
const STDERR_TAIL_LINES: usize = 20;

/// Runs one command line to completion
pub trait CommandRunner {
    /// Run `command_line` inside `cwd` and return its stdout.
    ///
    /// Fails with [`ScaffoldError::Command`] when the process cannot be
    /// started or does not exit successfully.
    fn run(&self, command_line: &str, cwd: &Path) -> impl Future<Output = Result<String>> + Send;
}

/// Runs command lines through the platform shell
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    /// Treat any stderr output as failure, even on a zero exit status
    strict_stderr: bool,
}

impl ShellRunner {
    pub fn new(strict_stderr: bool) -> Self {
        Self { strict_stderr }
    }

    fn shell(command_line: &str) -> TokioCommand {
        #[cfg(windows)]
        {
            let mut cmd = TokioCommand::new("cmd");
            cmd.arg("/C").arg(command_line);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = TokioCommand::new("sh");
            cmd.arg("-c").arg(command_line);
            cmd
        }
    }
}

impl CommandRunner for ShellRunner {
    async fn run(&self, command_line: &str, cwd: &Path) -> Result<String> {
        info!("Running `{}` in {}", command_line, cwd.display());

        let failed = |code: Option<i32>, message: String| ScaffoldError::Command {
            command: command_line.to_string(),
            code,
            message,
        };

        let mut child = Self::shell(command_line)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(None, format!("failed to start: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| failed(None, "stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| failed(None, "stderr was not captured".to_string()))?;

        let mut stdout_reader = BufReader::new(stdout).lines();
        let mut stderr_reader = BufReader::new(stderr).lines();
        let mut captured_out = String::new();
        let mut captured_err: Vec<String> = Vec::new();
        let mut stdout_open = true;
        let mut stderr_open = true;

        // Drain both pipes so a chatty child never blocks on a full buffer
        while stdout_open || stderr_open {
            tokio::select! {
                line = stdout_reader.next_line(), if stdout_open => {
                    match line {
                        Ok(Some(line)) => {
                            debug!(target: "timesaver::command", "{}", line);
                            captured_out.push_str(&line);
                            captured_out.push('\n');
                        }
                        Ok(None) => stdout_open = false,
                        Err(e) => {
                            warn!("Error reading stdout of `{}`: {}", command_line, e);
                            stdout_open = false;
                        }
                    }
                }
                line = stderr_reader.next_line(), if stderr_open => {
                    match line {
                        Ok(Some(line)) => {
                            debug!(target: "timesaver::command", "stderr: {}", line);
                            captured_err.push(line);
                        }
                        Ok(None) => stderr_open = false,
                        Err(e) => {
                            warn!("Error reading stderr of `{}`: {}", command_line, e);
                            stderr_open = false;
                        }
                    }
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| failed(None, format!("failed to wait for process: {}", e)))?;

        if !status.success() {
            return Err(failed(status.code(), stderr_tail(&captured_err)));
        }

        let wrote_stderr = captured_err.iter().any(|l| !l.trim().is_empty());
        if self.strict_stderr && wrote_stderr {
            return Err(failed(
                None,
                format!("wrote to stderr: {}", stderr_tail(&captured_err)),
            ));
        }

        debug!("`{}` finished successfully", command_line);
        Ok(captured_out)
    }
}

fn stderr_tail(lines: &[String]) -> String {
    if lines.iter().all(|l| l.trim().is_empty()) {
        return "no error output".to_string();
    }
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
