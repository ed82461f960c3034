use anyhow::Result;

use crate::{Dependency, Task};

/// Fluent surface for describing a task at registration time.
///
/// Borrows the task from the engine's registry, so dropping the builder
/// leaves the accumulated description in place.
#[derive(Debug)]
pub struct TaskBuilder<'a, C> {
    task: &'a mut Task<C>,
}

impl<'a, C> TaskBuilder<'a, C> {
    pub fn new(task: &'a mut Task<C>) -> Self {
        Self { task }
    }

    /// Human-readable description, shown in task listings.
    pub fn described(self, description: impl Into<String>) -> Self {
        self.task.description = Some(description.into());
        self
    }

    /// Require `name` to have run before this task.
    pub fn is_dependent_on(self, name: impl Into<String>) -> Self {
        self.task.add_dependency(Dependency::required(name));
        self
    }

    /// Depend on `name` only if it is registered; silently ignored otherwise.
    pub fn is_dependent_on_optional(self, name: impl Into<String>) -> Self {
        self.task.add_dependency(Dependency::optional(name));
        self
    }

    /// Require this task to run before `name`. Reverse declaration: `name`
    /// does not need to know about this task, or to exist yet.
    pub fn is_dependee_of(self, name: impl Into<String>) -> Self {
        self.task.add_dependee(Dependency::required(name));
        self
    }

    /// Run before `name` only if it is registered; silently ignored otherwise.
    pub fn is_dependee_of_optional(self, name: impl Into<String>) -> Self {
        self.task.add_dependee(Dependency::optional(name));
        self
    }

    /// Gate the task's actions on a predicate; every criterion must hold.
    pub fn with_criteria(self, criterion: impl Fn(&C) -> bool + 'static) -> Self {
        self.task.criteria.push((Box::new(criterion), None));
        self
    }

    /// Criterion with a custom skip reason for the report.
    pub fn with_criteria_msg(
        self,
        criterion: impl Fn(&C) -> bool + 'static,
        msg: impl Into<String>,
    ) -> Self {
        self.task.criteria.push((Box::new(criterion), Some(msg.into())));
        self
    }

    /// Append an action to the task body.
    pub fn does(self, action: impl Fn(&mut C) -> Result<()> + 'static) -> Self {
        self.task.actions.push(Box::new(action));
        self
    }

    /// Invoke `handler` with the failure if an action errors. A failure in
    /// the handler itself always aborts the run.
    pub fn on_error(self, handler: impl Fn(&anyhow::Error, &mut C) -> Result<()> + 'static) -> Self {
        self.task.error_handler = Some(Box::new(handler));
        self
    }

    /// Invoke `action` after execution, success or failure.
    pub fn finally(self, action: impl Fn(&mut C) -> Result<()> + 'static) -> Self {
        self.task.finally_handler = Some(Box::new(action));
        self
    }

    /// Per-task setup hook, run immediately before the task body.
    pub fn with_task_setup(self, action: impl Fn(&mut C) -> Result<()> + 'static) -> Self {
        self.task.setup = Some(Box::new(action));
        self
    }

    /// Per-task teardown hook, run after the finally hook whenever setup ran.
    pub fn with_task_teardown(self, action: impl Fn(&mut C) -> Result<()> + 'static) -> Self {
        self.task.teardown = Some(Box::new(action));
        self
    }

    /// A failure in this task does not halt the overall run.
    pub fn continue_on_error(self) -> Self {
        self.task.continue_on_error = true;
        self
    }

    /// Run every action even after one fails, then raise them together.
    pub fn defer_on_error(self) -> Self {
        self.task.defer_on_error = true;
        self
    }
}
