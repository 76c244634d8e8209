//! Command runner - the seam between the orchestrator and external tools
//!
//! The orchestrator treats the build toolchain, lint tool, sanitizer
//! interpreter and checkout mechanism as opaque commands with exit codes.
//! `CommandRunner` is the trait boundary; `ShellRunner` is the production
//! implementation, and tests substitute scripted mocks.

use crate::execution::error::StepError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

/// Captured output of one external command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code (0 = success)
    pub exit_code: i32,

    /// Captured stdout
    pub stdout: String,

    /// Captured stderr
    pub stderr: String,

    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Where a job's working copy comes from
#[derive(Debug, Clone)]
pub struct CheckoutSource {
    /// Repository path or URL
    pub repo: String,

    /// Commit to check out (None = branch head as cloned)
    pub commit: Option<String>,
}

impl CheckoutSource {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            commit: None,
        }
    }

    pub fn at_commit(mut self, commit: Option<String>) -> Self {
        self.commit = commit;
        self
    }
}

/// Executes external commands on behalf of job steps
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run an opaque shell command under the given environment and working
    /// directory, blocking until it exits
    async fn run_command(
        &self,
        command: &str,
        env: &HashMap<String, String>,
        cwd: &Path,
    ) -> Result<CommandOutput, StepError>;

    /// Materialize a working copy of the repository into `dest`
    ///
    /// Each job receives its own destination directory; implementations must
    /// never hand two jobs a shared mutable tree.
    async fn checkout(&self, source: &CheckoutSource, dest: &Path) -> Result<(), StepError>;
}

/// Production runner: `sh -c` for commands, `git` for checkouts
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    /// Per-command timeout in seconds (0 = no timeout)
    timeout_secs: u64,
}

impl ShellRunner {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    async fn wait_with_timeout(
        &self,
        child: tokio::process::Child,
    ) -> Result<std::process::Output, StepError> {
        if self.timeout_secs > 0 {
            tokio::time::timeout(
                std::time::Duration::from_secs(self.timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| StepError::Timeout(self.timeout_secs))?
            .map_err(StepError::from)
        } else {
            child.wait_with_output().await.map_err(StepError::from)
        }
    }

    async fn git(&self, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput, StepError> {
        let mut cmd = Command::new("git");
        cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let start = Instant::now();
        let child = cmd.spawn()?;
        let output = self.wait_with_timeout(child).await?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run_command(
        &self,
        command: &str,
        env: &HashMap<String, String>,
        cwd: &Path,
    ) -> Result<CommandOutput, StepError> {
        debug!(command, cwd = %cwd.display(), "spawning command");

        let start = Instant::now();
        let child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .envs(env)
            .current_dir(cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let output = self.wait_with_timeout(child).await?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn checkout(&self, source: &CheckoutSource, dest: &Path) -> Result<(), StepError> {
        debug!(repo = %source.repo, dest = %dest.display(), "checking out working copy");

        let dest_str = dest.to_string_lossy();
        let clone = self
            .git(&["clone", "--quiet", &source.repo, &dest_str], None)
            .await?;
        if !clone.success() {
            return Err(StepError::Checkout {
                message: format!("git clone failed: {}", clone.stderr.trim()),
            });
        }

        if let Some(commit) = &source.commit {
            let checkout = self
                .git(&["checkout", "--quiet", "--detach", commit], Some(dest))
                .await?;
            if !checkout.success() {
                return Err(StepError::Checkout {
                    message: format!(
                        "git checkout of {} failed: {}",
                        commit,
                        checkout.stderr.trim()
                    ),
                });
            }
        }

        Ok(())
    }
}
