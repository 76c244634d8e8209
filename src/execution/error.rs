//! Job-scoped execution errors

use thiserror::Error;

/// Errors raised while executing a job's step sequence
///
/// All variants are fatal to the owning job only: they terminate that job's
/// remaining steps and are recorded in its result, never propagated to
/// sibling jobs.
#[derive(Debug, Error)]
pub enum StepError {
    /// Repository unreachable or commit not found
    #[error("checkout failed: {message}")]
    Checkout { message: String },

    /// Tool installation command exited nonzero
    #[error("tool install exited with code {exit_code}")]
    ToolInstall { exit_code: i32 },

    /// Run step exited nonzero
    #[error("command exited with code {exit_code}")]
    Command { exit_code: i32 },

    /// Command exceeded the configured timeout
    #[error("command timed out after {0} seconds")]
    Timeout(u64),

    /// The command could not be spawned or the workspace prepared
    #[error("failed to launch step: {0}")]
    Launch(#[from] std::io::Error),
}

impl StepError {
    /// The exit code to record in the job result
    ///
    /// Steps that never produced an exit code (checkout, spawn failures,
    /// timeouts) record -1.
    pub fn exit_code(&self) -> i32 {
        match self {
            StepError::ToolInstall { exit_code } | StepError::Command { exit_code } => *exit_code,
            StepError::Checkout { .. } | StepError::Timeout(_) | StepError::Launch(_) => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(StepError::Command { exit_code: 101 }.exit_code(), 101);
        assert_eq!(StepError::ToolInstall { exit_code: 2 }.exit_code(), 2);
        assert_eq!(
            StepError::Checkout {
                message: "no such commit".to_string()
            }
            .exit_code(),
            -1
        );
        assert_eq!(StepError::Timeout(30).exit_code(), -1);
    }
}
