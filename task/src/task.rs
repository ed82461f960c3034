use anyhow::Result;

use crate::{Dependency, Errors};

/// Side-effecting task body operating on the caller's context.
pub type ActionFn<C> = dyn Fn(&mut C) -> Result<()>;
/// Boxed action, as stored on a task.
pub type TaskAction<C> = Box<ActionFn<C>>;
/// Predicate gating whether a task's actions run.
pub type Criterion<C> = Box<dyn Fn(&C) -> bool>;
/// Callback invoked with the failure when a task's action errors.
pub type ErrorHandler<C> = Box<dyn Fn(&anyhow::Error, &mut C) -> Result<()>>;

/// A named unit of work: ordered actions plus the declarations that tell the
/// engine when, and in what order, to run it. `C` is the caller-owned context
/// threaded through every callback during a run.
pub struct Task<C> {
    /// Unique within one engine; compared ignoring ASCII case.
    pub name: String,
    /// Shown in task listings when present.
    pub description: Option<String>,
    /// Run in registration order when the task executes.
    pub actions: Vec<TaskAction<C>>,
    /// All must hold for the task to run; the message, if any, becomes the
    /// skip reason in the report.
    pub criteria: Vec<(Criterion<C>, Option<String>)>,
    /// Tasks that must run before this one.
    pub dependencies: Vec<Dependency>,
    /// Tasks this one must run before (reverse declarations).
    pub dependees: Vec<Dependency>,
    /// Invoked with the failure if an action errors.
    pub error_handler: Option<ErrorHandler<C>>,
    /// Invoked after execution, success or failure.
    pub finally_handler: Option<TaskAction<C>>,
    /// Per-task setup hook; its failure always aborts the run.
    pub setup: Option<TaskAction<C>>,
    /// Per-task teardown hook; runs whenever setup ran.
    pub teardown: Option<TaskAction<C>>,
    /// A failure in this task does not halt the overall run.
    pub continue_on_error: bool,
    /// Run every action even after one fails, then raise the collected errors.
    pub defer_on_error: bool,
}

impl<C> Task<C> {
    /// Create an empty task with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            actions: Vec::with_capacity(1),
            criteria: Vec::with_capacity(0),
            dependencies: Vec::with_capacity(2),
            dependees: Vec::with_capacity(0),
            error_handler: None,
            finally_handler: None,
            setup: None,
            teardown: None,
            continue_on_error: false,
            defer_on_error: false,
        }
    }

    /// Case-insensitive name check, the comparison used everywhere task
    /// names meet (lookups, exclusions, dependency resolution).
    #[inline]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// First unsatisfied criterion, if any, with its skip reason.
    pub fn unmet_criteria(&self, ctx: &C) -> Option<String> {
        for (criterion, msg) in &self.criteria {
            if !criterion(ctx) {
                return Some(match msg {
                    Some(msg) => msg.clone(),
                    None => "criteria not satisfied".to_owned(),
                });
            }
        }
        None
    }

    /// True if every criterion holds (an empty set always runs).
    pub fn should_run(&self, ctx: &C) -> bool {
        self.unmet_criteria(ctx).is_none()
    }

    /// Run this task's actions in registration order. With `defer_on_error`
    /// set, every action runs and failures are collected, raised together
    /// after the last action; otherwise the first failure returns
    /// immediately.
    pub fn execute(&self, ctx: &mut C) -> Result<()> {
        if self.defer_on_error {
            let mut errors = Errors::default();
            for action in &self.actions {
                if let Err(e) = action(ctx) {
                    errors.add(e);
                }
            }
            errors.into_result(&format!("running actions for task '{}'", self.name))
        } else {
            for action in &self.actions {
                action(ctx)?;
            }
            Ok(())
        }
    }

    /// Record a forward dependency. Repeat declarations of the same target
    /// collapse to one; `required` sticks if any declaration required it.
    pub fn add_dependency(&mut self, dep: Dependency) {
        add_unique(&mut self.dependencies, dep);
    }

    /// Record a reverse ("run before") declaration on another task.
    pub fn add_dependee(&mut self, dep: Dependency) {
        add_unique(&mut self.dependees, dep);
    }
}

fn add_unique(deps: &mut Vec<Dependency>, dep: Dependency) {
    for existing in deps.iter_mut() {
        if existing.name.eq_ignore_ascii_case(&dep.name) {
            existing.required |= dep.required;
            return;
        }
    }
    deps.push(dep);
}

impl<C> std::fmt::Debug for Task<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("actions", &self.actions.len())
            .field("criteria", &self.criteria.len())
            .field("dependencies", &self.dependencies)
            .field("dependees", &self.dependees)
            .field("continue_on_error", &self.continue_on_error)
            .field("defer_on_error", &self.defer_on_error)
            .finish_non_exhaustive()
    }
}
