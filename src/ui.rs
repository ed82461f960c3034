use colored::Colorize;

use crate::exec::{Engine, Outcome, Report};
use crate::settings::Settings;

/// All interactions with the text UI should go through this struct.
/// The engine itself never prints; presenting the report to the user and
/// mapping failures to exit codes belong to the calling layer.
pub struct Ui {
    /// -v setting, displays extra text info to user
    pub verbose: bool,
}

impl Ui {
    pub fn new(settings: &Settings) -> Self {
        Self {
            verbose: settings.verbose > 0,
        }
    }

    /// Print the per-task outcome table and a total line.
    pub fn print_report(&self, report: &Report) {
        eprintln!();
        eprintln!("{:<40} {}", "Task".bold(), "Duration".bold());
        for entry in report {
            match &entry.outcome {
                Outcome::Executed => {
                    eprintln!("{:<40} {:?}", entry.task.green(), entry.duration);
                }
                Outcome::Skipped(reason) => {
                    eprintln!(
                        "{:<40} {}",
                        entry.task.yellow(),
                        format!("(skipped: {reason})").yellow()
                    );
                }
                Outcome::Failed => {
                    eprintln!(
                        "{:<40} {} {:?}",
                        entry.task.red(),
                        "(failed)".red(),
                        entry.duration
                    );
                }
                Outcome::Delegated => {
                    eprintln!("{:<40} {}", entry.task.cyan(), "(dry run)".cyan());
                }
            }
        }
        eprintln!(
            "{:<40} {:?}",
            "Total".bold(),
            report.total_duration()
        );
    }

    /// Print all registered tasks with their descriptions.
    pub fn print_task_list<C>(&self, engine: &Engine<C>) {
        for task in engine.tasks() {
            match &task.description {
                Some(description) => eprintln!("{:<30} {description}", task.name.cyan()),
                None => eprintln!("{}", task.name.cyan()),
            }
            if self.verbose {
                for dep in &task.dependencies {
                    eprintln!("  -> {}", dep.name);
                }
            }
        }
    }

    pub fn verbose_msg(&self, msg: &str) {
        if self.verbose {
            eprintln!("{}", msg);
        }
    }
}
