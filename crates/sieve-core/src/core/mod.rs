//! Stateless building blocks: the molecular graph model, line-notation I/O and
//! the pattern matching engine.

pub mod io;
pub mod matching;
pub mod models;
