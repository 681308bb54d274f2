//! # molsieve Core Library
//!
//! Order-preserving, bounded-concurrency screening of molecule records against a
//! set of structural patterns.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless pieces: the molecular graph model
//!   (`Molecule`), SMILES reading and writing, and the `PatternEngine` trait
//!   together with the built-in substructure engine.
//!
//! - **[`engine`]: The Logic Core.** The stateful pipeline. `PatternSet` holds
//!   the compiled patterns, `OrderedRowProcessor` dispatches records to a worker
//!   pool and finalizes them, in submission order, into a matched and an
//!   unmatched sink.
//!
//! - **[`workflows`]: The Public API.** Drives a processor over a whole record
//!   stream with progress reporting and cancellation.

pub mod core;
pub mod engine;
pub mod workflows;
