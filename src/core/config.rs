//! Workflow configuration from YAML

use crate::core::{
    job::Job,
    step::{Step, StepAction},
    trigger::{EventKind, Trigger},
    workflow::{Workflow, WorkflowDefaults},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// Errors that make a workflow definition unusable
///
/// All of these are fatal to the whole run at load time, before any job
/// starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read workflow file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed workflow YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("workflow defines no jobs")]
    NoJobs,

    #[error("duplicate job name: '{0}'")]
    DuplicateJob(String),

    #[error("job '{0}' has no steps")]
    EmptySteps(String),

    #[error("job '{job}' step {index}: '{kind}' requires a command")]
    MissingCommand {
        job: String,
        index: usize,
        kind: &'static str,
    },

    #[error("job '{job}' step {index}: 'checkout' does not take a command")]
    UnexpectedCommand { job: String, index: usize },
}

/// Step kinds as spelled in the workflow file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Checkout,
    RunCommand,
    InstallTool,
}

/// Step entry as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Step kind
    pub kind: StepKind,

    /// Command to execute (required for run_command and install_tool)
    #[serde(default)]
    pub command: Option<String>,

    /// Step-level environment overrides
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// Trigger entry as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Event kind to watch
    pub event: EventKind,

    /// Branch watch-list
    #[serde(default)]
    pub branches: Vec<String>,
}

/// Job entry as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Unique job name
    pub name: String,

    /// Job-level environment overlay
    #[serde(default)]
    pub environment: HashMap<String, String>,

    /// Ordered step sequence
    pub steps: Vec<StepConfig>,
}

/// Workflow-wide defaults as defined in YAML
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Per-command timeout in seconds (0 = no timeout)
    #[serde(default)]
    pub timeout_secs: u64,
}

/// Top-level workflow configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Workflow name
    pub name: String,

    /// Event/branch filters
    #[serde(default)]
    pub triggers: Vec<TriggerConfig>,

    /// Workflow-wide defaults
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Jobs to fan an event out across
    pub jobs: Vec<JobConfig>,
}

impl WorkflowConfig {
    /// Load workflow configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse workflow configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: WorkflowConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the workflow configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs.is_empty() {
            return Err(ConfigError::NoJobs);
        }

        let mut seen_names = HashSet::new();
        for job in &self.jobs {
            if !seen_names.insert(&job.name) {
                return Err(ConfigError::DuplicateJob(job.name.clone()));
            }

            if job.steps.is_empty() {
                return Err(ConfigError::EmptySteps(job.name.clone()));
            }

            for (index, step) in job.steps.iter().enumerate() {
                match step.kind {
                    StepKind::Checkout => {
                        if step.command.is_some() {
                            return Err(ConfigError::UnexpectedCommand {
                                job: job.name.clone(),
                                index,
                            });
                        }
                    }
                    StepKind::RunCommand | StepKind::InstallTool => {
                        if step.command.as_deref().map_or(true, str::is_empty) {
                            return Err(ConfigError::MissingCommand {
                                job: job.name.clone(),
                                index,
                                kind: match step.kind {
                                    StepKind::RunCommand => "run_command",
                                    _ => "install_tool",
                                },
                            });
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Convert the validated configuration into the frozen domain model
    pub fn to_workflow(&self) -> Result<Workflow, ConfigError> {
        let mut jobs = Vec::with_capacity(self.jobs.len());

        for job_config in &self.jobs {
            let mut steps = Vec::with_capacity(job_config.steps.len());
            for (index, step_config) in job_config.steps.iter().enumerate() {
                let action = match step_config.kind {
                    StepKind::Checkout => StepAction::Checkout,
                    StepKind::RunCommand => StepAction::RunCommand(
                        step_config
                            .command
                            .clone()
                            .ok_or_else(|| ConfigError::MissingCommand {
                                job: job_config.name.clone(),
                                index,
                                kind: "run_command",
                            })?,
                    ),
                    StepKind::InstallTool => StepAction::InstallTool(
                        step_config
                            .command
                            .clone()
                            .ok_or_else(|| ConfigError::MissingCommand {
                                job: job_config.name.clone(),
                                index,
                                kind: "install_tool",
                            })?,
                    ),
                };
                steps.push(Step::new(action).with_env(step_config.env.clone()));
            }

            jobs.push(Job::new(&job_config.name, steps).with_env(job_config.environment.clone()));
        }

        Ok(Workflow {
            name: self.name.clone(),
            triggers: self
                .triggers
                .iter()
                .map(|t| Trigger {
                    event: t.event,
                    branches: t.branches.clone(),
                })
                .collect(),
            jobs,
            defaults: WorkflowDefaults {
                timeout_secs: self.defaults.timeout_secs,
            },
        })
    }
}
