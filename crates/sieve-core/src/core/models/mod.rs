//! # Core Models Module
//!
//! This module contains the molecular graph representation used throughout molsieve.
//!
//! ## Key Components
//!
//! - [`element`] - Element symbols and atomic numbers
//! - [`atom`] - Atoms with element, aromaticity and charge
//! - [`topology`] - Bonds and bond orders
//! - [`molecule`] - The molecular graph itself
//!
//! ## Usage
//!
//! ```ignore
//! use molsieve::core::models::{atom::Atom, element::Element, molecule::Molecule};
//! use molsieve::core::models::topology::BondOrder;
//!
//! let mut molecule = Molecule::new();
//! let c = molecule.add_atom(Atom::new(Element::from_symbol("C").unwrap()));
//! let o = molecule.add_atom(Atom::new(Element::from_symbol("O").unwrap()));
//! molecule.add_bond(c, o, BondOrder::Double)?;
//! ```

pub mod atom;
pub mod element;
pub mod molecule;
pub mod topology;
