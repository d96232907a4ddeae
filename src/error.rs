// Error taxonomy for the search pipeline.
//
// Cancellation is a distinguished outcome, never folded into finder failures.
// Finder failures are isolated per invocation, collected while sibling work
// completes, and surfaced as one aggregate after the run.

use std::fmt;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// The caller's cancellation token fired; no new finder work was started
    /// after the signal was observed.
    #[error("search cancelled")]
    Cancelled,

    /// A single finder invocation failed.
    #[error("finder '{finder}' failed: {source}")]
    Finder {
        finder: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// Several failures occurred within one run; every inner failure is
    /// preserved.
    #[error("{0}")]
    Multiple(MultipleFailures),
}

pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    pub fn finder(finder: &'static str, source: anyhow::Error) -> Self {
        Self::Finder { finder, source }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Collapse a batch of failures into one error. Cancellation dominates;
    /// a single failure is returned as itself.
    pub fn aggregate(mut errors: Vec<SearchError>) -> Option<SearchError> {
        if errors.iter().any(SearchError::is_cancelled) {
            return Some(SearchError::Cancelled);
        }
        match errors.len() {
            0 => None,
            1 => Some(errors.remove(0)),
            _ => Some(SearchError::Multiple(MultipleFailures(errors))),
        }
    }

    /// Flat view of every inner failure (a single error yields itself).
    pub fn failures(&self) -> Vec<&SearchError> {
        match self {
            Self::Multiple(MultipleFailures(inner)) => inner.iter().collect(),
            other => vec![other],
        }
    }
}

/// Wrapper listing every failure from one run
#[derive(Debug)]
pub struct MultipleFailures(pub Vec<SearchError>);

impl fmt::Display for MultipleFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} search operations failed: ", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

/// Concurrent collector for per-invocation failures.
///
/// Fan-out batches push isolated finder failures here instead of aborting
/// sibling work; the executor drains it once at the end of the run.
#[derive(Debug, Default)]
pub(crate) struct FailureSink {
    inner: Mutex<Vec<SearchError>>,
}

impl FailureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, error: SearchError) {
        self.inner.lock().unwrap().push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    pub fn into_aggregate(self) -> Option<SearchError> {
        SearchError::aggregate(self.inner.into_inner().unwrap())
    }
}
