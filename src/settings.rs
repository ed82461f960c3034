use crate::args::Args;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("target task '{0}' cannot also be excluded")]
    TargetExcluded(String),
}

/// Settings are like Args, except all the logic has been applied so e.g.
/// defaults are filled in and contradictory flags have been rejected. This
/// is the resolved run tuple the engine consumes; argument parsing itself
/// stays with the host binary.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Name of the task to run, with everything it depends on.
    pub target: String,
    /// Preview the order without invoking task code.
    pub dry_run: bool,
    /// Run only the target, skipping its dependencies.
    pub exclusive: bool,
    /// Individual tasks to skip, by name.
    pub exclusions: Vec<String>,
    /// Keep running past task failures not marked continue-on-error.
    pub continue_on_error: bool,
    pub verbose: u8,
    /// List registered tasks instead of running.
    pub list: bool,
}

impl Settings {
    /// Plain settings for running `target`; everything else off.
    pub fn for_target(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            dry_run: false,
            exclusive: false,
            exclusions: Vec::with_capacity(0),
            continue_on_error: false,
            verbose: 0,
            list: false,
        }
    }
}

impl TryFrom<Args> for Settings {
    type Error = anyhow::Error;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        if args
            .exclude
            .iter()
            .any(|x| x.eq_ignore_ascii_case(&args.target))
        {
            return Err(Error::TargetExcluded(args.target).into());
        }

        Ok(Self {
            target: args.target,
            dry_run: args.dry_run,
            exclusive: args.exclusive,
            exclusions: args.exclude,
            continue_on_error: args.continue_on_error,
            verbose: args.verbose,
            list: args.list,
        })
    }
}
