//! Execution engine - converts events into runs and executes them

use crate::core::{JobStatus, RepoEvent, Run, RunStatus, Workflow};
use crate::execution::{
    executor::{JobContext, JobExecutor},
    runner::{CheckoutSource, CommandRunner},
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Events that can occur during run execution
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted {
        run_id: Uuid,
        workflow_name: String,
        job_count: usize,
    },
    JobStarted {
        job_name: String,
    },
    JobFinished {
        job_name: String,
        status: JobStatus,
        exit_code: Option<i32>,
    },
    RunFinished {
        run_id: Uuid,
        status: RunStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Strategy for scheduling job execution
///
/// Jobs share no state and declare no ordering, so the strategy only
/// changes wall-clock behavior, never observable results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingStrategy {
    /// Execute jobs one at a time, in configured order
    Sequential,

    /// One task per job, all at once
    Parallel,

    /// At most N jobs in flight
    LimitedParallel(usize),
}

impl Default for SchedulingStrategy {
    fn default() -> Self {
        SchedulingStrategy::Parallel
    }
}

/// Handle for aborting a run in flight
///
/// Jobs already terminal keep their results; still-running jobs are
/// recorded as failed with a cancellation note.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Pipeline orchestrator: filters events, fans jobs out, aggregates results
pub struct ExecutionEngine<R> {
    executor: Arc<JobExecutor<R>>,
    strategy: SchedulingStrategy,
    repo: String,
    workspace_root: PathBuf,
    event_handlers: Vec<EventHandler>,
    cancel_tx: watch::Sender<bool>,
}

impl<R: CommandRunner + 'static> ExecutionEngine<R> {
    pub fn new(runner: Arc<R>, strategy: SchedulingStrategy) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            executor: Arc::new(JobExecutor::new(runner)),
            strategy,
            repo: ".".to_string(),
            workspace_root: std::env::temp_dir().join("gantry"),
            event_handlers: Vec::new(),
            cancel_tx,
        }
    }

    /// Repository the checkout steps clone from
    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = repo.into();
        self
    }

    /// Root directory under which per-job working copies are created
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    /// Handle for cancelling an execution in flight
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: self.cancel_tx.clone(),
        }
    }

    fn emit(&self, event: ExecutionEvent) {
        emit_all(&self.event_handlers, event);
    }

    /// Filter an incoming event against the workflow's triggers
    ///
    /// No matching trigger is a quiet no-op, not an error. A match yields a
    /// run with one pending result per configured job.
    pub fn on_event(&self, workflow: &Workflow, event: &RepoEvent) -> Option<Run> {
        let trigger = workflow.matching_trigger(event)?;
        debug!(
            event = event.kind.name(),
            branch = %event.branch,
            branches = ?trigger.branches,
            "event matched trigger"
        );
        Some(Run::new(workflow, event.clone()))
    }

    /// Execute every job of the run and aggregate the outcome
    ///
    /// Jobs never abort each other: one job's failure leaves every sibling's
    /// execution and result untouched.
    pub async fn execute(&self, workflow: &Workflow, run: &mut Run) -> RunStatus {
        info!(run_id = %run.id, workflow = %workflow.name, "starting run");
        self.emit(ExecutionEvent::RunStarted {
            run_id: run.id,
            workflow_name: workflow.name.clone(),
            job_count: workflow.jobs.len(),
        });

        match self.strategy {
            SchedulingStrategy::Sequential => self.execute_sequential(workflow, run).await,
            SchedulingStrategy::Parallel => self.execute_concurrent(workflow, run, None).await,
            SchedulingStrategy::LimitedParallel(max) => {
                let semaphore = Arc::new(Semaphore::new(max.max(1)));
                self.execute_concurrent(workflow, run, Some(semaphore)).await
            }
        }

        // A job task that never reported (panic) must not pass the gate.
        for result in run.results.iter_mut() {
            if !result.status.is_terminal() {
                warn!(job = %result.job_name, "job never reached a terminal state");
                *result = crate::core::JobResult::cancelled(&result.job_name);
            }
        }

        let status = run.aggregate();
        info!(run_id = %run.id, ?status, "run finished");
        self.emit(ExecutionEvent::RunFinished {
            run_id: run.id,
            status,
        });
        status
    }

    async fn execute_sequential(&self, workflow: &Workflow, run: &mut Run) {
        let mut cancel_rx = self.cancel_tx.subscribe();

        for job in &workflow.jobs {
            if *cancel_rx.borrow() {
                let result = crate::core::JobResult::cancelled(&job.name);
                self.finish_job(run, result);
                continue;
            }

            self.emit(ExecutionEvent::JobStarted {
                job_name: job.name.clone(),
            });

            let ctx = self.context_for(run, &job.name);
            let result = tokio::select! {
                result = self.executor.execute(job, &ctx) => result,
                _ = cancel_rx.wait_for(|cancelled| *cancelled) => {
                    crate::core::JobResult::cancelled(&job.name)
                }
            };

            self.finish_job(run, result);
        }
    }

    async fn execute_concurrent(
        &self,
        workflow: &Workflow,
        run: &mut Run,
        semaphore: Option<Arc<Semaphore>>,
    ) {
        let mut join_set = tokio::task::JoinSet::new();

        for job in workflow.jobs.iter().cloned() {
            let executor = Arc::clone(&self.executor);
            let handlers = self.event_handlers.clone();
            let ctx = self.context_for(run, &job.name);
            let semaphore = semaphore.clone();
            let mut cancel_rx = self.cancel_tx.subscribe();

            join_set.spawn(async move {
                tokio::select! {
                    _ = cancel_rx.wait_for(|cancelled| *cancelled) => {
                        crate::core::JobResult::cancelled(&job.name)
                    }
                    result = async {
                        let _permit = match semaphore {
                            Some(s) => match s.acquire_owned().await {
                                Ok(permit) => Some(permit),
                                Err(_) => return crate::core::JobResult::cancelled(&job.name),
                            },
                            None => None,
                        };

                        emit_all(&handlers, ExecutionEvent::JobStarted {
                            job_name: job.name.clone(),
                        });
                        executor.execute(&job, &ctx).await
                    } => result,
                }
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(result) => self.finish_job(run, result),
                Err(e) => warn!(error = %e, "job task aborted"),
            }
        }
    }

    fn finish_job(&self, run: &mut Run, result: crate::core::JobResult) {
        self.emit(ExecutionEvent::JobFinished {
            job_name: result.job_name.clone(),
            status: result.status,
            exit_code: result.exit_code,
        });
        if let Some(slot) = run.result_mut(&result.job_name) {
            *slot = result;
        }
    }

    fn context_for(&self, run: &Run, job_name: &str) -> JobContext {
        JobContext {
            source: CheckoutSource::new(&self.repo).at_commit(run.event.commit.clone()),
            workdir: self
                .workspace_root
                .join(run.id.to_string())
                .join(job_name),
        }
    }
}

fn emit_all(handlers: &[EventHandler], event: ExecutionEvent) {
    for handler in handlers {
        handler(event.clone());
    }
}
