use anyhow::Result;
use colored::Colorize;

use task::{ActionFn, Task};

use super::engine::{TeardownHook, TeardownInfo};
use super::Outcome;

/// Policy object through which the engine performs every lifecycle step of a
/// run. The engine decides *what* happens and in what order; the strategy
/// decides whether user code is actually invoked, which is what makes dry
/// runs and recording test doubles possible without touching engine logic.
pub trait ExecutionStrategy<C> {
    /// Run the task body.
    fn execute_task(&mut self, task: &Task<C>, ctx: &mut C) -> Result<()>;

    /// Note a task that will not run, with the reason.
    fn skip(&mut self, task: &Task<C>, reason: &str);

    /// Run the global setup hook, once per run, before any task.
    fn perform_setup(&mut self, hook: Option<&ActionFn<C>>, ctx: &mut C) -> Result<()>;

    /// Run the global teardown hook, once per run, after all tasks or an abort.
    fn perform_teardown(
        &mut self,
        hook: Option<&TeardownHook<C>>,
        info: &TeardownInfo,
        ctx: &mut C,
    ) -> Result<()>;

    /// Run a task's setup hook.
    fn perform_task_setup(&mut self, task: &Task<C>, ctx: &mut C) -> Result<()>;

    /// Run a task's teardown hook.
    fn perform_task_teardown(&mut self, task: &Task<C>, ctx: &mut C) -> Result<()>;

    /// Note a task failure before it is handled or propagated.
    fn report_error(&mut self, task: &Task<C>, err: &anyhow::Error);

    /// Run the task's error handler with the failure.
    fn handle_error(&mut self, task: &Task<C>, err: &anyhow::Error, ctx: &mut C) -> Result<()>;

    /// Run the task's finally hook.
    fn invoke_finally(&mut self, task: &Task<C>, ctx: &mut C) -> Result<()>;

    /// Outcome recorded for a task this strategy completed without error.
    fn success_outcome(&self) -> Outcome {
        Outcome::Executed
    }
}

/// Invokes everything for real.
pub struct DefaultStrategy;

impl<C> ExecutionStrategy<C> for DefaultStrategy {
    fn execute_task(&mut self, task: &Task<C>, ctx: &mut C) -> Result<()> {
        log::debug!("executing task '{}'", task.name);
        task.execute(ctx)
    }

    fn skip(&mut self, task: &Task<C>, reason: &str) {
        log::info!("skipping task '{}': {reason}", task.name);
    }

    fn perform_setup(&mut self, hook: Option<&ActionFn<C>>, ctx: &mut C) -> Result<()> {
        match hook {
            Some(hook) => {
                log::debug!("running global setup");
                hook(ctx)
            }
            None => Ok(()),
        }
    }

    fn perform_teardown(
        &mut self,
        hook: Option<&TeardownHook<C>>,
        info: &TeardownInfo,
        ctx: &mut C,
    ) -> Result<()> {
        match hook {
            Some(hook) => {
                log::debug!("running global teardown (succeeded: {})", info.succeeded);
                hook(info, ctx)
            }
            None => Ok(()),
        }
    }

    fn perform_task_setup(&mut self, task: &Task<C>, ctx: &mut C) -> Result<()> {
        match &task.setup {
            Some(hook) => {
                log::debug!("running setup for task '{}'", task.name);
                hook(ctx)
            }
            None => Ok(()),
        }
    }

    fn perform_task_teardown(&mut self, task: &Task<C>, ctx: &mut C) -> Result<()> {
        match &task.teardown {
            Some(hook) => {
                log::debug!("running teardown for task '{}'", task.name);
                hook(ctx)
            }
            None => Ok(()),
        }
    }

    fn report_error(&mut self, task: &Task<C>, err: &anyhow::Error) {
        log::error!("{} in task '{}': {err:?}", "error".red(), task.name);
    }

    fn handle_error(&mut self, task: &Task<C>, err: &anyhow::Error, ctx: &mut C) -> Result<()> {
        match &task.error_handler {
            Some(handler) => {
                log::debug!("invoking error handler for task '{}'", task.name);
                handler(err, ctx)
            }
            None => Ok(()),
        }
    }

    fn invoke_finally(&mut self, task: &Task<C>, ctx: &mut C) -> Result<()> {
        match &task.finally_handler {
            Some(hook) => hook(ctx),
            None => Ok(()),
        }
    }
}

/// Walks the full order and skip logic without ever calling user code; only
/// records the sequence, for previewing a run with zero side effects.
#[derive(Default)]
pub struct DryRunStrategy {
    sequence: usize,
}

impl DryRunStrategy {
    /// Number of tasks this strategy has stepped over so far.
    pub fn sequence(&self) -> usize {
        self.sequence
    }
}

impl<C> ExecutionStrategy<C> for DryRunStrategy {
    fn execute_task(&mut self, task: &Task<C>, _ctx: &mut C) -> Result<()> {
        self.sequence += 1;
        log::info!("{}. {}", self.sequence, task.name);
        Ok(())
    }

    fn skip(&mut self, task: &Task<C>, reason: &str) {
        log::info!("skipping task '{}': {reason}", task.name);
    }

    fn perform_setup(&mut self, _hook: Option<&ActionFn<C>>, _ctx: &mut C) -> Result<()> {
        Ok(())
    }

    fn perform_teardown(
        &mut self,
        _hook: Option<&TeardownHook<C>>,
        _info: &TeardownInfo,
        _ctx: &mut C,
    ) -> Result<()> {
        Ok(())
    }

    fn perform_task_setup(&mut self, _task: &Task<C>, _ctx: &mut C) -> Result<()> {
        Ok(())
    }

    fn perform_task_teardown(&mut self, _task: &Task<C>, _ctx: &mut C) -> Result<()> {
        Ok(())
    }

    fn report_error(&mut self, task: &Task<C>, err: &anyhow::Error) {
        log::error!("error in task '{}': {err:?}", task.name);
    }

    fn handle_error(&mut self, _task: &Task<C>, _err: &anyhow::Error, _ctx: &mut C) -> Result<()> {
        Ok(())
    }

    fn invoke_finally(&mut self, _task: &Task<C>, _ctx: &mut C) -> Result<()> {
        Ok(())
    }

    fn success_outcome(&self) -> Outcome {
        Outcome::Delegated
    }
}
