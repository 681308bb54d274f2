//! Provides reading and writing of molecular line notations.
//!
//! The [`traits::LineNotation`] trait is the common interface; [`smiles`] implements
//! it for SMILES and also hosts the syntax parser that query compilation reuses.

pub mod smiles;
pub mod traits;
