//! Run state models

use crate::core::{trigger::RepoEvent, workflow::Workflow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a single job within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job has not started
    Pending,
    /// Job is currently executing its step sequence
    Running,
    /// Every step exited zero
    Succeeded,
    /// A step failed or the job was cancelled
    Failed,
}

impl JobStatus {
    /// Whether the job has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// Aggregated run status: the gate is binary, with no partial-success class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    Failed,
}

/// The recorded terminal outcome of one job within a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    /// Name of the job this result belongs to
    pub job_name: String,

    /// Current status
    pub status: JobStatus,

    /// Exit code of the failing step, or 0 on success
    pub exit_code: Option<i32>,

    /// Accumulated step log
    pub log: String,

    /// When the job started executing
    pub started_at: Option<DateTime<Utc>>,

    /// When the job reached a terminal state
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobResult {
    /// A fresh pending result, created when the run is constructed
    pub fn pending(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            status: JobStatus::Pending,
            exit_code: None,
            log: String::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn succeeded(job_name: impl Into<String>, log: String, started_at: DateTime<Utc>) -> Self {
        Self {
            job_name: job_name.into(),
            status: JobStatus::Succeeded,
            exit_code: Some(0),
            log,
            started_at: Some(started_at),
            finished_at: Some(Utc::now()),
        }
    }

    pub fn failed(
        job_name: impl Into<String>,
        exit_code: i32,
        log: String,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            job_name: job_name.into(),
            status: JobStatus::Failed,
            exit_code: Some(exit_code),
            log,
            started_at: Some(started_at),
            finished_at: Some(Utc::now()),
        }
    }

    /// A job whose execution context was torn down by run cancellation
    pub fn cancelled(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            status: JobStatus::Failed,
            exit_code: None,
            log: "job cancelled before completion\n".to_string(),
            started_at: None,
            finished_at: Some(Utc::now()),
        }
    }

    pub fn passed(&self) -> bool {
        self.status == JobStatus::Succeeded
    }
}

/// One invocation of the whole pipeline for a matched event
///
/// Owns exactly one `JobResult` per configured job, kept in configured
/// job order so reports are stable regardless of scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Unique run ID
    pub id: Uuid,

    /// Name of the workflow this run executes
    pub workflow_name: String,

    /// The event that created this run
    pub event: RepoEvent,

    /// Per-job results, in configured job order
    pub results: Vec<JobResult>,

    /// When the run was created
    pub created_at: DateTime<Utc>,
}

impl Run {
    /// Create a run for a matched event, with one pending result per job
    pub fn new(workflow: &Workflow, event: RepoEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            workflow_name: workflow.name.clone(),
            event,
            results: workflow
                .jobs
                .iter()
                .map(|j| JobResult::pending(&j.name))
                .collect(),
            created_at: Utc::now(),
        }
    }

    /// Get a job's result by name
    pub fn result(&self, job_name: &str) -> Option<&JobResult> {
        self.results.iter().find(|r| r.job_name == job_name)
    }

    /// Get a job's result mutably by name
    pub fn result_mut(&mut self, job_name: &str) -> Option<&mut JobResult> {
        self.results.iter_mut().find(|r| r.job_name == job_name)
    }

    /// Pure reduction over the job results
    ///
    /// Succeeded iff every job result is succeeded; anything short of that
    /// (a failure, a cancellation, a job that never reached terminal state)
    /// fails the run.
    pub fn aggregate(&self) -> RunStatus {
        if self.results.iter().all(|r| r.passed()) {
            RunStatus::Succeeded
        } else {
            RunStatus::Failed
        }
    }

    pub fn is_success(&self) -> bool {
        self.aggregate() == RunStatus::Succeeded
    }

    /// Number of jobs that passed
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    /// Number of jobs that did not pass
    pub fn failed_count(&self) -> usize {
        self.results.len() - self.passed_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::trigger::EventKind;

    fn run_with_results(results: Vec<JobResult>) -> Run {
        Run {
            id: Uuid::new_v4(),
            workflow_name: "verify".to_string(),
            event: RepoEvent::new(EventKind::Push, "master"),
            results,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_all_succeeded_aggregates_to_succeeded() {
        let now = Utc::now();
        let run = run_with_results(vec![
            JobResult::succeeded("build", String::new(), now),
            JobResult::succeeded("lint", String::new(), now),
        ]);
        assert_eq!(run.aggregate(), RunStatus::Succeeded);
        assert_eq!(run.passed_count(), 2);
        assert_eq!(run.failed_count(), 0);
    }

    #[test]
    fn test_single_failure_fails_the_run() {
        let now = Utc::now();
        let run = run_with_results(vec![
            JobResult::succeeded("build", String::new(), now),
            JobResult::failed("lint", 1, String::new(), now),
        ]);
        assert_eq!(run.aggregate(), RunStatus::Failed);
        assert_eq!(run.passed_count(), 1);
        assert_eq!(run.failed_count(), 1);
    }

    #[test]
    fn test_pending_result_fails_the_run() {
        let run = run_with_results(vec![JobResult::pending("build")]);
        assert_eq!(run.aggregate(), RunStatus::Failed);
    }

    #[test]
    fn test_cancelled_result_fails_the_run() {
        let now = Utc::now();
        let run = run_with_results(vec![
            JobResult::succeeded("build", String::new(), now),
            JobResult::cancelled("test"),
        ]);
        assert_eq!(run.aggregate(), RunStatus::Failed);
    }

    // Exhaustive sweep over every success/failure vector up to five jobs:
    // the aggregate must be Succeeded exactly when every job passed.
    #[test]
    fn test_aggregation_invariant_over_all_outcome_vectors() {
        let now = Utc::now();
        for job_count in 1..=5usize {
            for mask in 0u32..(1 << job_count) {
                let results: Vec<JobResult> = (0..job_count)
                    .map(|i| {
                        let name = format!("job{}", i);
                        if mask & (1 << i) != 0 {
                            JobResult::succeeded(name, String::new(), now)
                        } else {
                            JobResult::failed(name, 1, String::new(), now)
                        }
                    })
                    .collect();

                let all_passed = mask == (1 << job_count) - 1;
                let run = run_with_results(results);
                assert_eq!(
                    run.aggregate() == RunStatus::Succeeded,
                    all_passed,
                    "job_count={} mask={:b}",
                    job_count,
                    mask
                );
            }
        }
    }
}
