//! Core domain models for Gantry
//!
//! This module defines the fundamental data structures that represent
//! workflows, triggers, jobs, steps and run results.

pub mod config;
pub mod job;
pub mod run;
pub mod step;
pub mod trigger;
pub mod workflow;

pub use job::*;
pub use run::*;
pub use step::*;
pub use trigger::*;
pub use workflow::*;
