//!
//! millrun is a task dependency engine for build automation: hosts register
//! named tasks with dependencies, criteria, and lifecycle hooks, then ask
//! the engine to run a target. The engine resolves the dependency graph,
//! walks it in order through a pluggable execution strategy (real run or dry
//! run), and returns a timed report of per-task outcomes.

/// Definition of command-line args
mod args;
/// Engine, execution strategies, and report
mod exec;
/// Interpreted run settings
mod settings;
/// Text UI
mod ui;

pub use args::Args;
pub use exec::{
    DefaultStrategy, DryRunStrategy, Engine, Error, ExecutionStrategy, Outcome, Report,
    ReportEntry, TeardownFn, TeardownHook, TeardownInfo,
};
pub use settings::Settings;
pub use ui::Ui;

// re-export the building blocks hosts interact with:
pub use graph::Graph;
pub use task::{Dependency, Task, TaskBuilder};

/// Run the engine as a command-line app: parse args from the process
/// environment, set up logging, and run (or list, or preview) the target.
/// The caller maps the returned error to a process exit code.
pub fn run<C>(engine: &Engine<C>, ctx: &mut C) -> Result<(), anyhow::Error> {
    use clap::Parser;
    let args = Args::parse();

    // INTERPRET SETTINGS ///////////////
    let settings: Settings = args.try_into()?;

    let mut log_level = match settings.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    // a dry run's whole point is its printed sequence:
    if settings.dry_run && log_level < log::LevelFilter::Info {
        log_level = log::LevelFilter::Info;
    }
    simple_logging::log_to_stderr(log_level);

    // RUN THE THING /////////////////
    run_with_settings(engine, ctx, &settings)
}

/// Like [`run`], but with settings the host resolved itself.
pub fn run_with_settings<C>(
    engine: &Engine<C>,
    ctx: &mut C,
    settings: &Settings,
) -> Result<(), anyhow::Error> {
    let ui = Ui::new(settings);

    if settings.list {
        ui.print_task_list(engine);
        return Ok(());
    }

    let report = if settings.dry_run {
        ui.verbose_msg("Performing dry run.");
        let mut strategy = DryRunStrategy::default();
        engine.run_target(ctx, &mut strategy, settings)?
    } else {
        engine.run_target(ctx, &mut DefaultStrategy, settings)?
    };

    if !report.is_empty() {
        ui.print_report(&report);
    }

    Ok(())
}
