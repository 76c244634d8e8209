//! Run execution engine

pub mod engine;
pub mod error;
pub mod executor;
pub mod runner;

pub use engine::{CancelHandle, EventHandler, ExecutionEngine, ExecutionEvent, SchedulingStrategy};
pub use error::StepError;
pub use executor::{JobContext, JobExecutor};
pub use runner::{CheckoutSource, CommandOutput, CommandRunner, ShellRunner};
