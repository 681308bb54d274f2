use serde::Serialize;
use std::fmt;

/// Lifecycle of an [`OrderedRowProcessor`](super::processor::OrderedRowProcessor).
///
/// `Idle → Running → Draining → Finalized`, with `Cancelled` and `Failed` as
/// terminal exits from `Running` or `Draining`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunState {
    Idle,
    Running,
    Draining,
    Finalized,
    Cancelled,
    Failed,
}

impl RunState {
    pub fn accepts_records(&self) -> bool {
        matches!(self, Self::Idle | Self::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized | Self::Cancelled | Self::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Finalized => "finalized",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Counters of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunSummary {
    pub submitted: u64,
    pub matched: u64,
    pub unmatched: u64,
}

impl RunSummary {
    pub fn finalized(&self) -> u64 {
        self.matched + self.unmatched
    }
}
