/// Orchestrates one target run
mod engine;
pub use engine::{Engine, TeardownFn, TeardownHook, TeardownInfo};

/// Pluggable execution policies
mod strategy;
pub use strategy::{DefaultStrategy, DryRunStrategy, ExecutionStrategy};

/// Per-run record of task outcomes
mod report;
pub use report::{Outcome, Report, ReportEntry};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Task with the name '{0}' has already been added")]
    DuplicateTask(String),
    #[error("Task name is empty")]
    EmptyTaskName,
}
