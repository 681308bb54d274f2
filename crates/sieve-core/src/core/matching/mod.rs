//! Structural pattern matching.
//!
//! [`engine`] defines the [`PatternEngine`](engine::PatternEngine) seam the
//! processing pipeline evaluates through. [`substructure`] provides the built-in
//! implementation over [`Molecule`](crate::core::models::molecule::Molecule)
//! graphs, with queries compiled by [`query`].

pub mod engine;
pub mod query;
pub mod substructure;
