use super::config::ConfigError;
use super::state::RunState;
use std::io;
use thiserror::Error;

/// A pattern that failed to compile. Carries the position in the input list and
/// the source text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid pattern #{index} '{pattern}': {reason}")]
pub struct InvalidPatternError {
    pub index: usize,
    pub pattern: String,
    pub reason: String,
}

/// Evaluation failed for one record. Recovered per record; the run continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub struct MatchEvaluationError {
    pub pattern_index: Option<usize>,
    pub reason: String,
}

impl MatchEvaluationError {
    pub fn new(pattern_index: Option<usize>, reason: impl Into<String>) -> Self {
        Self {
            pattern_index,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for MatchEvaluationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.pattern_index {
            Some(index) => write!(f, "Match evaluation failed for pattern #{index}: {}", self.reason),
            None => write!(f, "Match evaluation failed: {}", self.reason),
        }
    }
}

/// Run-level failures. These always end the run.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error(transparent)]
    InvalidPattern(#[from] InvalidPatternError),

    #[error("Invalid processor configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Run cancelled after {finalized} finalized records")]
    Cancelled { finalized: u64 },

    #[error("Worker fault while processing record {index}: {message}")]
    WorkerFault { index: u64, message: String },

    #[error("Failed to write to sink: {0}")]
    Sink(#[from] io::Error),

    #[error("Processor is not accepting records in state {state:?}")]
    NotAccepting { state: RunState },
}
