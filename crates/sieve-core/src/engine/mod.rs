//! # Engine Module
//!
//! The stateful screening pipeline built on the stateless [`crate::core`] layer.
//!
//! ## Overview
//!
//! An [`OrderedRowProcessor`](processor::OrderedRowProcessor) accepts records one
//! at a time, evaluates them against a compiled [`PatternSet`](pattern_set::PatternSet)
//! on a bounded rayon pool and finalizes them into two sinks in exactly the order
//! they were submitted. Ordering comes from the [`reorder`] buffer, not from the
//! pool: workers may complete in any order.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - queue bound, worker count and output mode
//! - **Records** ([`record`]) - input rows, outcomes and the sink trait
//! - **Evaluation** ([`pattern_set`]) - ordered, shareable compiled patterns
//! - **Processing** ([`processor`]) - submission, backpressure and finalization
//! - **Run State** ([`state`]) - lifecycle and summary counters
//! - **Progress Monitoring** ([`progress`]) - callback-based progress events
//! - **Cancellation** ([`cancel`]) - cooperative stop requests
//! - **Error Handling** ([`error`]) - per-record and run-level errors

pub mod cancel;
pub(crate) mod compute;
pub mod config;
pub mod error;
pub mod pattern_set;
pub mod processor;
pub mod progress;
pub mod record;
pub mod reorder;
pub mod state;
