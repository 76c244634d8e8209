//! Step domain model

use std::collections::HashMap;

/// The action a step performs
///
/// A closed set: unknown step kinds are rejected at configuration load,
/// never discovered at execution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Acquire an isolated working copy of the repository at the
    /// triggering commit
    Checkout,

    /// Execute an opaque shell command; the exit code is authoritative
    RunCommand(String),

    /// Run an idempotent installation command for an external tool
    InstallTool(String),
}

impl StepAction {
    /// Step kind name, as spelled in the workflow file
    pub fn kind_name(&self) -> &'static str {
        match self {
            StepAction::Checkout => "checkout",
            StepAction::RunCommand(_) => "run_command",
            StepAction::InstallTool(_) => "install_tool",
        }
    }

    /// The command string, for the kinds that carry one
    pub fn command(&self) -> Option<&str> {
        match self {
            StepAction::Checkout => None,
            StepAction::RunCommand(cmd) | StepAction::InstallTool(cmd) => Some(cmd),
        }
    }
}

/// A single step within a job
///
/// Steps execute strictly in declaration order; a step's failure aborts the
/// remaining steps of its owning job only.
#[derive(Debug, Clone)]
pub struct Step {
    /// What this step does
    pub action: StepAction,

    /// Step-level environment overrides, overlaid on the job environment
    pub env: HashMap<String, String>,
}

impl Step {
    pub fn new(action: StepAction) -> Self {
        Self {
            action,
            env: HashMap::new(),
        }
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Merge the owning job's environment with this step's overrides
    ///
    /// Step-level keys win over job-level keys.
    pub fn merged_env(&self, job_env: &HashMap<String, String>) -> HashMap<String, String> {
        let mut env = job_env.clone();
        env.extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(StepAction::Checkout.kind_name(), "checkout");
        assert_eq!(
            StepAction::RunCommand("cargo test".to_string()).kind_name(),
            "run_command"
        );
        assert_eq!(
            StepAction::InstallTool("cargo install typos-cli".to_string()).kind_name(),
            "install_tool"
        );
    }

    #[test]
    fn test_merged_env_step_overrides_job() {
        let mut job_env = HashMap::new();
        job_env.insert("RUSTFLAGS".to_string(), "-D warnings".to_string());
        job_env.insert("CI".to_string(), "true".to_string());

        let mut step_env = HashMap::new();
        step_env.insert("RUSTFLAGS".to_string(), "".to_string());

        let step = Step::new(StepAction::RunCommand("cargo build".to_string())).with_env(step_env);

        let merged = step.merged_env(&job_env);
        assert_eq!(merged.get("RUSTFLAGS"), Some(&"".to_string()));
        assert_eq!(merged.get("CI"), Some(&"true".to_string()));
    }

    #[test]
    fn test_merged_env_empty_overrides() {
        let mut job_env = HashMap::new();
        job_env.insert("MIRIFLAGS".to_string(), "-Zmiri-tree-borrows".to_string());

        let step = Step::new(StepAction::RunCommand("cargo miri test".to_string()));
        let merged = step.merged_env(&job_env);
        assert_eq!(merged, job_env);
    }
}
