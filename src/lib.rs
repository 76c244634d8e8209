//! gantry - a build-verification pipeline orchestrator

pub mod cli;
pub mod core;
pub mod execution;

// Re-export commonly used types
pub use crate::core::config::{ConfigError, WorkflowConfig};
pub use crate::core::{
    EventKind, Job, JobResult, JobStatus, RepoEvent, Run, RunStatus, Step, StepAction, Trigger,
    Workflow,
};
pub use crate::execution::{
    CancelHandle, CheckoutSource, CommandOutput, CommandRunner, ExecutionEngine, ExecutionEvent,
    JobExecutor, SchedulingStrategy, ShellRunner, StepError,
};
