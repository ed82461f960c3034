//!
//! Builds a directed graph from a flat task collection and resolves the
//! execution order for a target in 3 steps:
//! 1. Add one node per task.
//! 2. Materialize forward and reverse dependency declarations into a single
//!    forward edge set, validating that required targets exist.
//! 3. Walk depth-first from the target in post-order, dependencies before
//!    dependents, detecting cycles along the way.
//!
//! The graph is rebuilt from the current task collection on every
//! resolution, so graph lifetime = one resolution call.

/// graph struct + accessors
mod graph;
pub use graph::{Edge, Graph};

/// two-pass construction from task declarations
mod builder;
use builder::GraphBuilder;

/// depth-first ordering and cycle detection
mod dfs;

pub type NodeId = usize;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Task '{task}' is dependent on task '{dependency}' which does not exist")]
    MissingDependency { task: String, dependency: String },
    #[error("Task '{task}' is declared a dependee of task '{dependee}' which does not exist")]
    MissingDependee { task: String, dependee: String },
    #[error("Task '{0}' depends on itself")]
    ReflexiveTask(String),
    #[error("Circular dependency detected involving task '{0}'")]
    CircularDependency(String),
    #[error("The target task '{0}' was not found")]
    TargetNotFound(String),
}
