//! Blocking execution of external tools.
//!
//! Every call waits for the child to exit. There is no timeout and no retry: a
//! solver that hangs blocks the study until it is stopped from outside.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::error::RunError;
use crate::tools::{Tool, ToolCommand};

/// How a non-zero exit status is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitPolicy {
    /// Log the status and carry on as if the tool succeeded
    #[default]
    Permissive,
    /// Abort with [`RunError::Failed`]
    Strict,
}

/// Result of one finished tool invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub tool: Tool,
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
    pub elapsed: Duration,
}

impl RunOutcome {
    pub fn from_status(tool: Tool, status: ExitStatus, elapsed: Duration) -> Self {
        Self {
            tool,
            exit_code: status.code(),
            success: status.success(),
            elapsed,
        }
    }

    /// Apply the exit policy, logging non-zero exits distinctly from success.
    pub fn enforce(self, policy: ExitPolicy) -> Result<Self, RunError> {
        if self.success {
            tracing::info!(
                tool = %self.tool,
                elapsed_secs = self.elapsed.as_secs_f64(),
                "Tool finished"
            );
            return Ok(self);
        }

        match policy {
            ExitPolicy::Permissive => {
                tracing::warn!(
                    tool = %self.tool,
                    exit_code = ?self.exit_code,
                    "Tool exited unsuccessfully; continuing"
                );
                Ok(self)
            }
            ExitPolicy::Strict => Err(RunError::Failed {
                tool: self.tool,
                code: self.exit_code,
            }),
        }
    }
}

/// Runs a tool command line to completion
pub trait ProcessRunner {
    /// Run `command` and wait for it to exit.
    ///
    /// With `capture`, the child's standard output is collected and written to
    /// that path once the child has exited; otherwise it goes to the console.
    fn run(&self, command: &ToolCommand, capture: Option<&Path>) -> Result<RunOutcome, RunError>;
}

/// Runs commands through the platform shell in a fixed working directory
#[derive(Debug, Clone)]
pub struct ShellRunner {
    work_dir: PathBuf,
}

impl ShellRunner {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }
}

impl ProcessRunner for ShellRunner {
    fn run(&self, command: &ToolCommand, capture: Option<&Path>) -> Result<RunOutcome, RunError> {
        let mut cmd = shell_command(&command.line);
        cmd.current_dir(&self.work_dir);

        tracing::debug!(tool = %command.tool, command = %command, "Launching");
        let started = Instant::now();
        let spawn_error = |source| RunError::Spawn {
            tool: command.tool,
            source,
        };

        let status = match capture {
            Some(path) => {
                let output = cmd
                    .stdout(Stdio::piped())
                    .stderr(Stdio::inherit())
                    .output()
                    .map_err(spawn_error)?;
                fs::write(path, &output.stdout).map_err(|source| RunError::Capture {
                    path: path.to_path_buf(),
                    source,
                })?;
                output.status
            }
            None => cmd.status().map_err(spawn_error)?,
        };

        Ok(RunOutcome::from_status(command.tool, status, started.elapsed()))
    }
}

#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(line);
    cmd
}

#[cfg(not(windows))]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(line);
    cmd
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_capture_writes_stdout_after_exit() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("StarOutput.txt");
        let runner = ShellRunner::new(dir.path());

        let outcome = runner
            .run(&ToolCommand::new(Tool::Cfd, "echo building; echo done"), Some(&log))
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.exit_code, Some(0));
        assert_eq!(fs::read_to_string(&log).unwrap(), "building\ndone\n");
    }

    #[test]
    fn test_runs_in_work_dir() {
        let dir = tempdir().unwrap();
        let runner = ShellRunner::new(dir.path());

        runner
            .run(&ToolCommand::new(Tool::Structural, "touch marker"), None)
            .unwrap();

        assert!(dir.path().join("marker").exists());
    }

    #[test]
    fn test_nonzero_exit_is_reported() {
        let dir = tempdir().unwrap();
        let runner = ShellRunner::new(dir.path());

        let outcome = runner
            .run(&ToolCommand::new(Tool::Structural, "exit 3"), None)
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, Some(3));

        let permissive = outcome.clone().enforce(ExitPolicy::Permissive).unwrap();
        assert_eq!(permissive.exit_code, Some(3));

        let err = outcome.enforce(ExitPolicy::Strict).unwrap_err();
        assert!(matches!(
            err,
            RunError::Failed {
                tool: Tool::Structural,
                code: Some(3)
            }
        ));
    }
}
