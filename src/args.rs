use clap::Parser;

const CMD_NAME: &str = "millrun";
const DEFAULT_TARGET: &str = "Default";

/// Stores our command-line args format.
#[derive(Parser)]
#[command(name = CMD_NAME, version, about = None, long_about = None)]
pub struct Args {
    /// Name of the target task
    #[arg(short, long, value_name = "TASK", default_value = DEFAULT_TARGET)]
    #[arg(env = "MILLRUN_TARGET")]
    pub target: String,

    /// Print the execution order without running any task code
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Run only the target task, skipping its dependencies
    #[arg(long)]
    pub exclusive: bool,

    /// Skip the named task (repeatable)
    #[arg(short, long = "exclude", value_name = "TASK")]
    pub exclude: Vec<String>,

    /// Keep running when a task fails
    #[arg(long)]
    pub continue_on_error: bool,

    /// Print additional debugging info
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// List registered tasks and exit
    #[arg(short, long)]
    pub list: bool,
}
