//!
//! Task model for the millrun engine: a named unit of work with ordered
//! actions, run criteria, dependency declarations, lifecycle hooks, and an
//! error policy. Tasks are described through the fluent [`TaskBuilder`] at
//! registration time and are not mutated once a run starts.

/// Task struct and callback type aliases
mod task;
pub use task::{ActionFn, Criterion, ErrorHandler, Task, TaskAction};

/// Fluent registration surface
mod builder;
pub use builder::TaskBuilder;

/// Forward and reverse dependency declarations
mod dependency;
pub use dependency::Dependency;

/// Error collection and aggregation
mod errors;
pub use errors::{AggregatedErrors, Errors};
