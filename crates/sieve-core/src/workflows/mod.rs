//! # Workflows Module
//!
//! High-level entry points that drive the [`engine`](crate::engine) over a whole
//! input stream.
//!
//! - **Screening Workflow** ([`screen`]) - compiles the patterns, feeds every
//!   record of an iterator through an ordered processor and closes the run.

pub mod screen;
