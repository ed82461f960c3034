/// For re-throwing after we've logged a list of errors.
#[derive(Debug, thiserror::Error)]
#[error("{0} failed due to {1} errors")]
pub struct AggregatedErrors(pub String, pub usize);

// in future we can add a `warnings` field, too.
pub struct Errors {
    errors: Vec<anyhow::Error>,
}

impl Default for Errors {
    fn default() -> Self {
        Self {
            // ideally we won't have any,
            // and we don't mind reallocating if we're already in an error state:
            errors: Vec::with_capacity(0),
        }
    }
}

impl Errors {
    pub fn add_context(&mut self, e: anyhow::Error, msg: String) {
        log::trace!("{msg}: {e:?}");
        self.errors.push(e.context(msg));
    }

    pub fn add(&mut self, e: anyhow::Error) {
        log::trace!("error: {e:?}");
        self.errors.push(e);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Collapse collected errors into a single failure. A lone error passes
    /// through untouched; multiple errors are each logged in full, then
    /// folded into an [`AggregatedErrors`] so none of them is dropped.
    pub fn into_error(mut self, label: &str) -> anyhow::Error {
        debug_assert!(!self.errors.is_empty());
        if self.errors.len() == 1 {
            return self.errors.swap_remove(0);
        }
        for e in &self.errors {
            log::error!("while {label}: {e:?}");
        }
        AggregatedErrors(label.to_owned(), self.errors.len()).into()
    }

    /// Fail w/ an aggregated error if one or more errors were collected.
    pub fn into_result(self, label: &str) -> Result<(), anyhow::Error> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.into_error(label))
        }
    }
}
