//! Test utility functions for gantry

use async_trait::async_trait;
use gantry::{
    CheckoutSource, CommandOutput, CommandRunner, EventKind, ExecutionEngine, JobStatus,
    RepoEvent, Run, RunStatus, SchedulingStrategy, StepError, WorkflowConfig,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock runner scripted by command string
///
/// Commands not mentioned in the script exit zero. Optionally fails any
/// command when a given environment key/value is present, which lets tests
/// model jobs that differ only by an environment overlay.
pub struct MockRunner {
    exit_codes: HashMap<String, i32>,
    fail_on_env: Option<(String, String, i32)>,
    delays: HashMap<String, Duration>,
    executed: Mutex<Vec<ExecutedCommand>>,
}

#[derive(Debug, Clone)]
pub struct ExecutedCommand {
    pub command: String,
    pub env: HashMap<String, String>,
}

impl MockRunner {
    /// Every command exits zero
    pub fn passing() -> Self {
        Self::with_exit_codes(HashMap::new())
    }

    pub fn with_exit_codes(exit_codes: HashMap<String, i32>) -> Self {
        Self {
            exit_codes,
            fail_on_env: None,
            delays: HashMap::new(),
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Fail any command run with `key=value` in its environment
    pub fn fail_on_env(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        exit_code: i32,
    ) -> Self {
        self.fail_on_env = Some((key.into(), value.into(), exit_code));
        self
    }

    /// Delay a specific command before it exits
    pub fn delay(mut self, command: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(command.into(), delay);
        self
    }

    /// Every command executed so far, in execution order
    pub fn executed(&self) -> Vec<ExecutedCommand> {
        self.executed.lock().unwrap().clone()
    }

    pub fn executed_commands(&self) -> Vec<String> {
        self.executed().into_iter().map(|e| e.command).collect()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run_command(
        &self,
        command: &str,
        env: &HashMap<String, String>,
        _cwd: &Path,
    ) -> Result<CommandOutput, StepError> {
        if let Some(delay) = self.delays.get(command) {
            tokio::time::sleep(*delay).await;
        }

        self.executed.lock().unwrap().push(ExecutedCommand {
            command: command.to_string(),
            env: env.clone(),
        });

        let mut exit_code = *self.exit_codes.get(command).unwrap_or(&0);
        if let Some((key, value, code)) = &self.fail_on_env {
            if env.get(key) == Some(value) {
                exit_code = *code;
            }
        }

        Ok(CommandOutput {
            exit_code,
            stdout: String::new(),
            stderr: String::new(),
            duration_ms: 1,
        })
    }

    async fn checkout(&self, _source: &CheckoutSource, _dest: &Path) -> Result<(), StepError> {
        Ok(())
    }
}

/// Build an engine over a temp workspace and execute the run for `event`
///
/// Panics if the event does not match a trigger; use `deliver_event` when a
/// test cares about the no-match case.
pub async fn run_workflow_with(
    runner: Arc<MockRunner>,
    yaml: &str,
    event: RepoEvent,
    strategy: SchedulingStrategy,
) -> (Run, RunStatus) {
    let workflow = load_workflow(yaml);
    let engine = test_engine(runner, strategy);

    let mut run = engine
        .on_event(&workflow, &event)
        .expect("event should match a trigger");
    let status = engine.execute(&workflow, &mut run).await;
    (run, status)
}

/// Deliver an event without executing; returns the pending run, if any
pub fn deliver_event(yaml: &str, event: RepoEvent) -> Option<Run> {
    let workflow = load_workflow(yaml);
    let engine = test_engine(Arc::new(MockRunner::passing()), SchedulingStrategy::Parallel);
    engine.on_event(&workflow, &event)
}

pub fn load_workflow(yaml: &str) -> gantry::Workflow {
    WorkflowConfig::from_yaml(yaml)
        .expect("workflow YAML should parse")
        .to_workflow()
        .expect("workflow YAML should convert")
}

pub fn test_engine(
    runner: Arc<MockRunner>,
    strategy: SchedulingStrategy,
) -> ExecutionEngine<MockRunner> {
    ExecutionEngine::new(runner, strategy).with_workspace_root(
        std::env::temp_dir().join(format!("gantry-it-{}", uuid::Uuid::new_v4())),
    )
}

pub fn push_to(branch: &str) -> RepoEvent {
    RepoEvent::new(EventKind::Push, branch)
}

pub fn assert_job_succeeded(run: &Run, job_name: &str) {
    let result = run
        .result(job_name)
        .unwrap_or_else(|| panic!("no result for job '{}'", job_name));
    assert_eq!(
        result.status,
        JobStatus::Succeeded,
        "job '{}' should have succeeded, log:\n{}",
        job_name,
        result.log
    );
    assert_eq!(result.exit_code, Some(0));
}

pub fn assert_job_failed(run: &Run, job_name: &str, exit_code: i32) {
    let result = run
        .result(job_name)
        .unwrap_or_else(|| panic!("no result for job '{}'", job_name));
    assert_eq!(
        result.status,
        JobStatus::Failed,
        "job '{}' should have failed",
        job_name
    );
    assert_eq!(
        result.exit_code,
        Some(exit_code),
        "job '{}' should record the failing step's exit code",
        job_name
    );
}
