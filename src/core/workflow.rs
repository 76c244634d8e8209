//! Workflow domain model

use crate::core::{
    job::Job,
    trigger::{RepoEvent, Trigger},
};

/// Workflow-wide defaults
#[derive(Debug, Clone, Copy)]
pub struct WorkflowDefaults {
    /// Per-command timeout in seconds (0 = no timeout)
    pub timeout_secs: u64,
}

impl Default for WorkflowDefaults {
    fn default() -> Self {
        Self { timeout_secs: 0 }
    }
}

/// A loaded workflow definition: triggers plus a fixed set of jobs
///
/// Loaded once at startup and frozen; re-running requires a fresh load.
#[derive(Debug, Clone)]
pub struct Workflow {
    /// Workflow name
    pub name: String,

    /// Event/branch filters that decide whether a run is created
    pub triggers: Vec<Trigger>,

    /// Jobs, in configured order
    pub jobs: Vec<Job>,

    /// Workflow-wide defaults
    pub defaults: WorkflowDefaults,
}

impl Workflow {
    /// Find the first trigger matching an incoming event, if any
    pub fn matching_trigger(&self, event: &RepoEvent) -> Option<&Trigger> {
        self.triggers.iter().find(|t| t.matches(event))
    }

    /// Get a job by name
    pub fn job(&self, name: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.name == name)
    }

    /// Job names in configured order
    pub fn job_names(&self) -> Vec<&str> {
        self.jobs.iter().map(|j| j.name.as_str()).collect()
    }
}
