use std::time::Duration;

/// What happened to one considered task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Actions ran to completion.
    Executed,
    /// Actions never ran, with the reason (unmet criteria, exclusion).
    Skipped(String),
    /// Actions failed but the run was allowed to continue.
    Failed,
    /// Considered by a strategy that does not invoke user code (dry run).
    Delegated,
}

/// One row of the report.
#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub task: String,
    pub outcome: Outcome,
    /// Wall-clock time around the execute step only; zero for skipped tasks.
    pub duration: Duration,
}

impl ReportEntry {
    pub fn new(task: String, outcome: Outcome, duration: Duration) -> Self {
        Self {
            task,
            outcome,
            duration,
        }
    }

    pub fn skipped(task: &str, reason: String) -> Self {
        Self::new(task.to_owned(), Outcome::Skipped(reason), Duration::ZERO)
    }
}

/// Ordered record of per-task outcomes for one run. Appended to in execution
/// order while the engine runs, read-only once returned to the caller.
#[derive(Debug, Default)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    pub(crate) fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    /// True iff no task was considered; callers use this to decide whether
    /// the report is worth printing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReportEntry> {
        self.entries.iter()
    }

    /// Entry for the named task, compared ignoring ASCII case.
    pub fn find(&self, task: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.task.eq_ignore_ascii_case(task))
    }

    /// Sum of recorded execute durations.
    pub fn total_duration(&self) -> Duration {
        self.entries.iter().map(|e| e.duration).sum()
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a ReportEntry;
    type IntoIter = std::slice::Iter<'a, ReportEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
