/// A declared ordering relationship between two tasks.
///
/// Held by the declaring task; the graph builder materializes it into an
/// edge. A required dependency whose target is never registered fails the
/// graph build, an optional one is dropped silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Name of the other task.
    pub name: String,
    /// Fail the graph build if the other task does not exist.
    pub required: bool,
}

impl Dependency {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }
}
