//! Job executor - runs one job's step sequence in its own context

use crate::core::{Job, JobResult, Step, StepAction};
use crate::execution::{
    error::StepError,
    runner::{CheckoutSource, CommandRunner},
};
use chrono::Utc;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-job execution context
///
/// Every job gets its own working directory; nothing in here is shared
/// with sibling jobs.
#[derive(Debug, Clone)]
pub struct JobContext {
    /// Where a checkout step takes its working copy from
    pub source: CheckoutSource,

    /// The job's isolated working directory
    pub workdir: PathBuf,
}

/// Executes a single job
pub struct JobExecutor<R> {
    runner: Arc<R>,
}

impl<R: CommandRunner> JobExecutor<R> {
    pub fn new(runner: Arc<R>) -> Self {
        Self { runner }
    }

    /// Execute the job's steps strictly in declaration order
    ///
    /// The first failing step records its exit code, marks the job failed
    /// and skips the remaining steps. Exhausting all steps succeeds the job.
    pub async fn execute(&self, job: &Job, ctx: &JobContext) -> JobResult {
        let started_at = Utc::now();
        let mut log = String::new();

        info!(job = %job.name, "job started");

        if let Err(e) = tokio::fs::create_dir_all(&ctx.workdir).await {
            warn!(job = %job.name, error = %e, "failed to prepare workspace");
            let _ = writeln!(log, "failed to prepare workspace: {}", e);
            return JobResult::failed(&job.name, -1, log, started_at);
        }

        for (index, step) in job.steps.iter().enumerate() {
            let _ = writeln!(log, "--- step {} ({})", index + 1, step.action.kind_name());

            match self.run_step(job, step, ctx, &mut log).await {
                Ok(()) => {}
                Err(err) => {
                    let exit_code = err.exit_code();
                    let _ = writeln!(log, "{}", err);
                    let skipped = job.steps.len() - index - 1;
                    if skipped > 0 {
                        let _ = writeln!(log, "skipping {} remaining step(s)", skipped);
                    }
                    warn!(job = %job.name, step = index + 1, exit_code, "job failed");
                    return JobResult::failed(&job.name, exit_code, log, started_at);
                }
            }
        }

        info!(job = %job.name, "job succeeded");
        JobResult::succeeded(&job.name, log, started_at)
    }

    async fn run_step(
        &self,
        job: &Job,
        step: &Step,
        ctx: &JobContext,
        log: &mut String,
    ) -> Result<(), StepError> {
        match &step.action {
            StepAction::Checkout => {
                self.runner.checkout(&ctx.source, &ctx.workdir).await?;
                let _ = writeln!(log, "checked out {}", ctx.source.repo);
                Ok(())
            }
            StepAction::RunCommand(command) | StepAction::InstallTool(command) => {
                let env = step.merged_env(&job.env);
                debug!(job = %job.name, command, "running step command");

                let output = self.runner.run_command(command, &env, &ctx.workdir).await?;
                let _ = writeln!(log, "$ {}", command);
                if !output.stdout.is_empty() {
                    let _ = writeln!(log, "{}", output.stdout.trim_end());
                }
                if !output.stderr.is_empty() {
                    let _ = writeln!(log, "{}", output.stderr.trim_end());
                }

                if output.success() {
                    Ok(())
                } else if matches!(step.action, StepAction::InstallTool(_)) {
                    Err(StepError::ToolInstall {
                        exit_code: output.exit_code,
                    })
                } else {
                    Err(StepError::Command {
                        exit_code: output.exit_code,
                    })
                }
            }
        }
    }
}
