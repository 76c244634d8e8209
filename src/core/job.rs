//! Job domain model

use crate::core::step::Step;
use std::collections::HashMap;

/// An independent, isolated sequence of steps with its own pass/fail outcome
///
/// Jobs are created from static configuration at load time and never mutated
/// afterwards. They declare no ordering or data dependency on each other;
/// every job gets its own execution context and working copy. A job that
/// needs a tool installs it with its own `install_tool` step rather than
/// relying on a sibling job's side effects.
#[derive(Debug, Clone)]
pub struct Job {
    /// Unique job name within the workflow
    pub name: String,

    /// Ordered step sequence
    pub steps: Vec<Step>,

    /// Job-level environment overlay, applied to every step
    pub env: HashMap<String, String>,
}

impl Job {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
            env: HashMap::new(),
        }
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }
}
