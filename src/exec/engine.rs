use anyhow::{anyhow, Context, Result};

use graph::Graph;
use task::{ActionFn, Errors, Task, TaskBuilder};
use util::{HashSet, Hasher, Timer};

use super::{Error, ExecutionStrategy, Outcome, Report, ReportEntry};
use crate::settings::Settings;

/// Passed to the global teardown hook: whether the run succeeded, and the
/// failure that ended it otherwise.
pub struct TeardownInfo<'a> {
    pub succeeded: bool,
    pub error: Option<&'a anyhow::Error>,
}

/// Global teardown callback.
pub type TeardownHook<C> = dyn Fn(&TeardownInfo, &mut C) -> Result<()>;
/// Boxed global teardown callback, as stored on the engine.
pub type TeardownFn<C> = Box<TeardownHook<C>>;

type SetupFn<C> = Box<ActionFn<C>>;

/// `Engine` owns the task registry and runs targets against it.
///
/// Tasks are registered up front through [`Engine::register_task`]; a run
/// resolves the dependency graph fresh, walks the resulting order one task
/// at a time, and returns a [`Report`] of what happened. Execution is
/// strictly sequential: a task's full lifecycle (setup, execute, error
/// handling, finally, teardown) completes before the next task starts.
/// Multiple sequential runs against one engine are fine; the graph never
/// outlives a single resolution.
pub struct Engine<C> {
    tasks: Vec<Task<C>>,
    setup: Option<SetupFn<C>>,
    teardown: Option<TeardownFn<C>>,
}

impl<C> Default for Engine<C> {
    fn default() -> Self {
        Self {
            tasks: Vec::with_capacity(16),
            setup: None,
            teardown: None,
        }
    }
}

impl<C> Engine<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task and return the builder for describing it. A name
    /// matching an existing registration (ignoring ASCII case) is rejected,
    /// not overwritten.
    pub fn register_task(&mut self, name: impl Into<String>) -> Result<TaskBuilder<'_, C>, Error> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyTaskName);
        }
        if self.tasks.iter().any(|t| t.is_named(&name)) {
            return Err(Error::DuplicateTask(name));
        }
        log::trace!("registered task '{name}'");
        self.tasks.push(Task::new(name));
        let last = self.tasks.len() - 1;
        Ok(TaskBuilder::new(&mut self.tasks[last]))
    }

    /// Global setup hook, run once per run before any task.
    pub fn setup(&mut self, hook: impl Fn(&mut C) -> Result<()> + 'static) {
        self.setup = Some(Box::new(hook));
    }

    /// Global teardown hook, run exactly once per run, after all tasks or
    /// after an abort.
    pub fn teardown(&mut self, hook: impl Fn(&TeardownInfo, &mut C) -> Result<()> + 'static) {
        self.teardown = Some(Box::new(hook));
    }

    /// Registered tasks, in registration order.
    pub fn tasks(&self) -> &[Task<C>] {
        &self.tasks
    }

    /// Look up a task by name, ignoring ASCII case.
    pub fn find_task(&self, name: &str) -> Option<&Task<C>> {
        self.tasks.iter().find(|t| t.is_named(name))
    }

    /// Run all tasks needed to reach `settings.target`, in dependency order,
    /// through the given strategy.
    pub fn run_target(
        &self,
        ctx: &mut C,
        strategy: &mut dyn ExecutionStrategy<C>,
        settings: &Settings,
    ) -> Result<Report> {
        let timer = Timer::start();

        // graph and target errors are fatal before anything runs:
        let graph = Graph::build(&self.tasks)?;
        let order = graph.traverse(&settings.target)?;
        log::debug!(
            "resolved {} of {} tasks for target '{}'",
            order.len(),
            graph.node_count(),
            settings.target,
        );

        let excluded = excluded_names(settings);

        let mut report = Report::default();
        let run_result =
            self.run_ordered(ctx, strategy, settings, &order, &excluded, &mut report);
        let result = self.finish(ctx, strategy, run_result);

        log::debug!("run finished in {:?}", timer.elapsed());
        result.map(|()| report)
    }

    fn run_ordered(
        &self,
        ctx: &mut C,
        strategy: &mut dyn ExecutionStrategy<C>,
        settings: &Settings,
        order: &[String],
        excluded: &HashSet<String>,
        report: &mut Report,
    ) -> Result<()> {
        strategy
            .perform_setup(self.setup.as_deref(), ctx)
            .context("while running global setup")?;

        for name in order {
            let task = self
                .find_task(name)
                .ok_or_else(|| anyhow!("resolved task '{name}' is not registered"))?;
            self.run_task(task, ctx, strategy, settings, excluded, report)?;
        }
        Ok(())
    }

    fn run_task(
        &self,
        task: &Task<C>,
        ctx: &mut C,
        strategy: &mut dyn ExecutionStrategy<C>,
        settings: &Settings,
        excluded: &HashSet<String>,
        report: &mut Report,
    ) -> Result<()> {
        // criteria first; a gated-out task runs no hooks at all:
        if let Some(reason) = task.unmet_criteria(ctx) {
            strategy.skip(task, &reason);
            report.push(ReportEntry::skipped(&task.name, reason));
            return Ok(());
        }

        if is_excluded(task, settings, excluded) {
            strategy.skip(task, "excluded");
            report.push(ReportEntry::skipped(&task.name, "excluded".to_owned()));
            return Ok(());
        }

        // a task setup failure always aborts the run, continue-on-error does
        // not apply: later tasks may depend on state it failed to establish.
        strategy
            .perform_task_setup(task, ctx)
            .with_context(|| format!("while running setup for task '{}'", task.name))?;

        // timed around exactly the execute step:
        let timer = Timer::start();
        let exec_result = strategy.execute_task(task, ctx);
        let elapsed = timer.elapsed();

        let mut fatal: Option<anyhow::Error> = None;
        match exec_result {
            Ok(()) => {
                report.push(ReportEntry::new(
                    task.name.clone(),
                    strategy.success_outcome(),
                    elapsed,
                ));
            }
            Err(e) => {
                strategy.report_error(task, &e);
                report.push(ReportEntry::new(task.name.clone(), Outcome::Failed, elapsed));
                if let Err(handler_err) = strategy.handle_error(task, &e, ctx) {
                    // broken error handling is never recoverable:
                    fatal = Some(handler_err.context(format!(
                        "while running error handler for task '{}'",
                        task.name
                    )));
                } else if task.continue_on_error || settings.continue_on_error {
                    log::info!("task '{}' failed but the run continues", task.name);
                } else {
                    fatal = Some(e.context(format!("task '{}' failed", task.name)));
                }
            }
        }

        // the finally hook always runs after execution, before teardown:
        if let Err(e) = strategy.invoke_finally(task, ctx) {
            let e = e.context(format!("while running finally hook for task '{}'", task.name));
            fatal = Some(merge_fatal(fatal.take(), e, &task.name));
        }

        // task teardown mirrors setup; its failure is fatal and must not
        // mask an error we are already unwinding:
        if let Err(e) = strategy.perform_task_teardown(task, ctx) {
            let e = e.context(format!("while running teardown for task '{}'", task.name));
            fatal = Some(merge_fatal(fatal.take(), e, &task.name));
        }

        match fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn finish(
        &self,
        ctx: &mut C,
        strategy: &mut dyn ExecutionStrategy<C>,
        run_result: Result<()>,
    ) -> Result<()> {
        let info = TeardownInfo {
            succeeded: run_result.is_ok(),
            error: run_result.as_ref().err(),
        };
        let teardown_result = strategy
            .perform_teardown(self.teardown.as_deref(), &info, ctx)
            .context("while running global teardown");

        match (run_result, teardown_result) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Err(run_err), Err(teardown_err)) => {
                // both must surface; neither may swallow the other:
                let mut errors = Errors::default();
                errors.add(run_err);
                errors.add(teardown_err);
                Err(errors.into_error("completing the run"))
            }
        }
    }
}

fn excluded_names(settings: &Settings) -> HashSet<String> {
    let mut set =
        HashSet::with_capacity_and_hasher(settings.exclusions.len(), Hasher::default());
    for name in &settings.exclusions {
        set.insert(name.to_ascii_lowercase());
    }
    set
}

fn is_excluded<C>(task: &Task<C>, settings: &Settings, excluded: &HashSet<String>) -> bool {
    // the requested target itself is never excluded:
    if task.is_named(&settings.target) {
        return false;
    }
    settings.exclusive || excluded.contains(&task.name.to_ascii_lowercase())
}

fn merge_fatal(pending: Option<anyhow::Error>, e: anyhow::Error, task: &str) -> anyhow::Error {
    match pending {
        None => e,
        Some(prior) => {
            let mut errors = Errors::default();
            errors.add(prior);
            errors.add(e);
            errors.into_error(&format!("running task '{task}'"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::DefaultStrategy;
    use task::AggregatedErrors;

    type Ctx = Vec<String>;

    fn note(msg: &'static str) -> impl Fn(&mut Ctx) -> Result<()> {
        move |log: &mut Ctx| {
            log.push(msg.to_owned());
            Ok(())
        }
    }

    fn run(engine: &Engine<Ctx>, target: &str) -> (Ctx, Result<Report>) {
        let mut ctx = Ctx::new();
        let result = engine.run_target(
            &mut ctx,
            &mut DefaultStrategy,
            &Settings::for_target(target),
        );
        (ctx, result)
    }

    #[test]
    fn lifecycle_hooks_run_in_order() {
        let mut engine = Engine::new();
        engine.setup(note("global setup"));
        engine.teardown(|info, log: &mut Ctx| {
            assert!(info.succeeded);
            log.push("global teardown".to_owned());
            Ok(())
        });
        engine
            .register_task("work")
            .unwrap()
            .with_task_setup(note("task setup"))
            .does(note("action"))
            .finally(note("finally"))
            .with_task_teardown(note("task teardown"));

        let (ctx, result) = run(&engine, "work");
        result.unwrap();
        assert_eq!(
            ctx,
            [
                "global setup",
                "task setup",
                "action",
                "finally",
                "task teardown",
                "global teardown",
            ]
        );
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut engine = Engine::<Ctx>::new();
        engine.register_task("build").unwrap();
        let e = engine.register_task("BUILD").unwrap_err();
        assert!(matches!(e, Error::DuplicateTask(name) if name == "BUILD"));
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut engine = Engine::<Ctx>::new();
        assert!(matches!(
            engine.register_task(""),
            Err(Error::EmptyTaskName)
        ));
    }

    #[test]
    fn criteria_skip_runs_no_hooks() {
        let mut engine = Engine::new();
        engine
            .register_task("gated")
            .unwrap()
            .with_criteria(|_| false)
            .with_task_setup(note("setup"))
            .does(note("action"))
            .finally(note("finally"))
            .with_task_teardown(note("teardown"));

        let (ctx, result) = run(&engine, "gated");
        let report = result.unwrap();
        assert!(ctx.is_empty(), "no hooks may run for a skipped task");
        assert_eq!(
            report.find("gated").map(|e| &e.outcome),
            Some(&Outcome::Skipped("criteria not satisfied".to_owned()))
        );
    }

    #[test]
    fn task_setup_failure_aborts_despite_continue_on_error() {
        let mut engine = Engine::new();
        engine.register_task("broken-env").unwrap()
            .continue_on_error()
            .with_task_setup(|_: &mut Ctx| Err(anyhow!("no disk space")))
            .does(note("action"))
            .with_task_teardown(note("teardown"));
        engine
            .register_task("after")
            .unwrap()
            .is_dependent_on("broken-env")
            .does(note("after"));
        engine.teardown(|info, log: &mut Ctx| {
            assert!(!info.succeeded);
            log.push("global teardown".to_owned());
            Ok(())
        });

        let (ctx, result) = run(&engine, "after");
        assert!(result.is_err());
        // no action, no task teardown; global teardown still ran:
        assert_eq!(ctx, ["global teardown"]);
    }

    #[test]
    fn global_setup_failure_skips_tasks_but_reaches_teardown() {
        let mut engine = Engine::new();
        engine.setup(|_: &mut Ctx| Err(anyhow!("setup died")));
        engine.teardown(|info, log: &mut Ctx| {
            assert!(!info.succeeded);
            let cause = info.error.map(|e| format!("{e:#}")).unwrap_or_default();
            log.push(format!("teardown saw: {cause}"));
            Ok(())
        });
        engine.register_task("work").unwrap().does(note("action"));

        let (ctx, result) = run(&engine, "work");
        assert!(result.is_err());
        assert_eq!(ctx.len(), 1, "no task action may run");
        assert!(ctx[0].starts_with("teardown saw:"));
        assert!(ctx[0].contains("setup died"));
    }

    #[test]
    fn error_handler_receives_the_failure() {
        let mut engine = Engine::new();
        engine
            .register_task("flaky")
            .unwrap()
            .continue_on_error()
            .does(|_: &mut Ctx| Err(anyhow!("flake")))
            .on_error(|e, log: &mut Ctx| {
                log.push(format!("handled: {e}"));
                Ok(())
            });

        let (ctx, result) = run(&engine, "flaky");
        result.unwrap();
        assert_eq!(ctx, ["handled: flake"]);
    }

    #[test]
    fn completed_error_handler_does_not_recover_the_failure() {
        // without a continue-on-error flag, a handler that completes still
        // leaves the task failure fatal:
        let mut engine = Engine::new();
        engine
            .register_task("flaky")
            .unwrap()
            .does(|_: &mut Ctx| Err(anyhow!("flake")))
            .on_error(|_, log: &mut Ctx| {
                log.push("handled".to_owned());
                Ok(())
            });
        engine
            .register_task("after")
            .unwrap()
            .is_dependent_on("flaky")
            .does(note("after"));

        let (ctx, result) = run(&engine, "after");
        let e = result.unwrap_err();
        assert!(format!("{e:#}").contains("flake"));
        assert_eq!(ctx, ["handled"], "handler ran, later tasks did not");
    }

    #[test]
    fn error_handler_failure_is_fatal_despite_continue_on_error() {
        let mut engine = Engine::new();
        engine
            .register_task("flaky")
            .unwrap()
            .continue_on_error()
            .does(|_: &mut Ctx| Err(anyhow!("flake")))
            .on_error(|_, _: &mut Ctx| Err(anyhow!("handler is broken")));
        engine
            .register_task("after")
            .unwrap()
            .is_dependent_on("flaky")
            .does(note("after"));

        let (ctx, result) = run(&engine, "after");
        assert!(result.is_err());
        assert!(ctx.is_empty(), "later tasks must not run");
    }

    #[test]
    fn finally_runs_on_failure_before_abort() {
        let mut engine = Engine::new();
        engine
            .register_task("doomed")
            .unwrap()
            .does(|_: &mut Ctx| Err(anyhow!("boom")))
            .finally(note("finally"))
            .with_task_teardown(note("teardown"));

        let (ctx, result) = run(&engine, "doomed");
        assert!(result.is_err());
        assert_eq!(ctx, ["finally", "teardown"]);
    }

    #[test]
    fn teardown_failure_while_unwinding_surfaces_both() {
        let mut engine = Engine::new();
        engine
            .register_task("doomed")
            .unwrap()
            .does(|_: &mut Ctx| Err(anyhow!("action failed")))
            .with_task_teardown(|_: &mut Ctx| Err(anyhow!("teardown failed")));

        let (_, result) = run(&engine, "doomed");
        let e = result.unwrap_err();
        let agg = e.downcast_ref::<AggregatedErrors>().expect("aggregate");
        assert_eq!(agg.1, 2);
    }

    #[test]
    fn global_teardown_failure_does_not_swallow_run_failure() {
        let mut engine = Engine::new();
        engine
            .register_task("doomed")
            .unwrap()
            .does(|_: &mut Ctx| Err(anyhow!("action failed")));
        engine.teardown(|_, _: &mut Ctx| Err(anyhow!("teardown failed")));

        let (_, result) = run(&engine, "doomed");
        let e = result.unwrap_err();
        let agg = e.downcast_ref::<AggregatedErrors>().expect("aggregate");
        assert_eq!(agg.1, 2);
    }

    #[test]
    fn global_continue_on_error_upgrades_unmarked_tasks() {
        let mut engine = Engine::new();
        engine
            .register_task("fragile")
            .unwrap()
            .does(|_: &mut Ctx| Err(anyhow!("boom")));
        engine
            .register_task("after")
            .unwrap()
            .is_dependent_on("fragile")
            .does(note("after"));

        // without the global flag the run aborts:
        let (ctx, result) = run(&engine, "after");
        assert!(result.is_err());
        assert!(ctx.is_empty());

        // with it, the failure is recorded and the run completes:
        let mut settings = Settings::for_target("after");
        settings.continue_on_error = true;
        let mut ctx = Ctx::new();
        let report = engine
            .run_target(&mut ctx, &mut DefaultStrategy, &settings)
            .unwrap();
        assert_eq!(ctx, ["after"]);
        assert_eq!(
            report.find("fragile").map(|e| &e.outcome),
            Some(&Outcome::Failed)
        );
    }

    #[test]
    fn excluded_dependency_is_skipped_but_target_runs() {
        let mut engine = Engine::new();
        engine.register_task("dep").unwrap().does(note("dep"));
        engine
            .register_task("goal")
            .unwrap()
            .is_dependent_on("dep")
            .does(note("goal"));

        let mut settings = Settings::for_target("goal");
        settings.exclusions = vec!["DEP".to_owned()];
        let mut ctx = Ctx::new();
        let report = engine
            .run_target(&mut ctx, &mut DefaultStrategy, &settings)
            .unwrap();
        assert_eq!(ctx, ["goal"]);
        assert_eq!(
            report.find("dep").map(|e| &e.outcome),
            Some(&Outcome::Skipped("excluded".to_owned()))
        );
    }

    #[test]
    fn exclusive_run_skips_every_dependency() {
        let mut engine = Engine::new();
        engine.register_task("a").unwrap().does(note("a"));
        engine
            .register_task("b")
            .unwrap()
            .is_dependent_on("a")
            .does(note("b"));
        engine
            .register_task("goal")
            .unwrap()
            .is_dependent_on("b")
            .does(note("goal"));

        let mut settings = Settings::for_target("goal");
        settings.exclusive = true;
        let mut ctx = Ctx::new();
        let report = engine
            .run_target(&mut ctx, &mut DefaultStrategy, &settings)
            .unwrap();
        assert_eq!(ctx, ["goal"]);
        assert_eq!(report.len(), 3, "skipped tasks still appear in the report");
    }

    #[test]
    fn sequential_runs_against_one_engine() {
        let mut engine = Engine::new();
        engine.register_task("tick").unwrap().does(note("tick"));

        let (first, result) = run(&engine, "tick");
        result.unwrap();
        let (second, result) = run(&engine, "tick");
        result.unwrap();
        assert_eq!(first, second);
    }
}
