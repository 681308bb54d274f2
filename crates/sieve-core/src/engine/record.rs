use super::error::MatchEvaluationError;
use std::io;

/// The molecule slot of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<M> {
    Molecule(M),
    /// The record has no molecule.
    Missing,
    /// The record has a molecule that could not be read.
    Unreadable { reason: String },
}

impl<M> Payload<M> {
    pub fn molecule(&self) -> Option<&M> {
        match self {
            Self::Molecule(molecule) => Some(molecule),
            _ => None,
        }
    }
}

/// One input record.
///
/// `passthrough` is whatever the caller needs to write the record back out
/// (typically the original columns). It stays on the submitting thread.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<M, C> {
    pub key: String,
    pub payload: Payload<M>,
    pub passthrough: C,
}

impl<M, C> Row<M, C> {
    pub fn new(key: impl Into<String>, payload: Payload<M>, passthrough: C) -> Self {
        Self {
            key: key.into(),
            payload,
            passthrough,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub matched: bool,
    /// Unique mapping count per pattern, in pattern order.
    pub counts: Option<Vec<usize>>,
    /// Matched molecule atoms across all patterns, ascending and deduplicated.
    pub atoms: Option<Vec<usize>>,
    /// Matched molecule bonds across all patterns, ascending and deduplicated.
    pub bonds: Option<Vec<usize>>,
}

impl MatchResult {
    pub fn classified(matched: bool) -> Self {
        Self {
            matched,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// No molecule was evaluated.
    Missing,
    Evaluated(MatchResult),
    Failed(MatchEvaluationError),
}

impl RowOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Evaluated(result) if result.matched)
    }

    pub fn result(&self) -> Option<&MatchResult> {
        match self {
            Self::Evaluated(result) => Some(result),
            _ => None,
        }
    }
}

/// A submitted record still awaiting finalization.
#[derive(Debug)]
pub(crate) struct PendingTask<C> {
    pub index: u64,
    pub key: String,
    pub passthrough: C,
}

/// A record as delivered to a sink, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedRow<M, C> {
    pub index: u64,
    pub key: String,
    pub payload: Payload<M>,
    pub outcome: RowOutcome,
    pub passthrough: C,
}

/// Destination for finalized records. Written only from the thread driving the
/// processor.
pub trait RowSink<M, C> {
    fn push_row(&mut self, row: FinalizedRow<M, C>) -> io::Result<()>;
}

impl<M, C> RowSink<M, C> for Vec<FinalizedRow<M, C>> {
    fn push_row(&mut self, row: FinalizedRow<M, C>) -> io::Result<()> {
        self.push(row);
        Ok(())
    }
}

impl<M, C, S: RowSink<M, C> + ?Sized> RowSink<M, C> for &mut S {
    fn push_row(&mut self, row: FinalizedRow<M, C>) -> io::Result<()> {
        (**self).push_row(row)
    }
}
