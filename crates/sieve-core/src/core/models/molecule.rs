use super::atom::Atom;
use super::topology::{Bond, BondOrder};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoleculeError {
    #[error("Atom index {index} is out of range (molecule has {count} atoms)")]
    AtomOutOfRange { index: usize, count: usize },
    #[error("Atom {0} cannot be bonded to itself")]
    SelfBond(usize),
    #[error("Atoms {0} and {1} are already bonded")]
    DuplicateBond(usize, usize),
}

/// A molecular graph: atoms connected by typed bonds.
///
/// Atom and bond identifiers are their insertion indices. They are stable for
/// the lifetime of the molecule, which is what makes them usable as match
/// positions in screening output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an atom and returns its identifier.
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    /// Adds a bond between two existing atoms and returns its identifier.
    ///
    /// # Errors
    ///
    /// Fails if either atom does not exist, if both ends are the same atom, or if
    /// the two atoms are already bonded.
    pub fn add_bond(
        &mut self,
        begin: usize,
        end: usize,
        order: BondOrder,
    ) -> Result<usize, MoleculeError> {
        for index in [begin, end] {
            if index >= self.atoms.len() {
                return Err(MoleculeError::AtomOutOfRange {
                    index,
                    count: self.atoms.len(),
                });
            }
        }
        if begin == end {
            return Err(MoleculeError::SelfBond(begin));
        }
        if self.bond_between(begin, end).is_some() {
            return Err(MoleculeError::DuplicateBond(begin, end));
        }
        self.bonds.push(Bond::new(begin, end, order));
        Ok(self.bonds.len() - 1)
    }

    pub fn atom(&self, id: usize) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn bond(&self, id: usize) -> Option<&Bond> {
        self.bonds.get(id)
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Finds the bond joining two atoms, in either direction.
    pub fn bond_between(&self, a: usize, b: usize) -> Option<usize> {
        self.bonds
            .iter()
            .position(|bond| bond.other(a) == Some(b))
    }

    /// Builds an adjacency list of `(neighbour, bond)` pairs, indexed by atom.
    pub fn adjacency(&self) -> Vec<Vec<(usize, usize)>> {
        let mut adjacency = vec![Vec::new(); self.atoms.len()];
        for (bond_id, bond) in self.bonds.iter().enumerate() {
            adjacency[bond.begin].push((bond.end, bond_id));
            adjacency[bond.end].push((bond.begin, bond_id));
        }
        adjacency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;

    fn atom(symbol: &str) -> Atom {
        Atom::new(Element::from_symbol(symbol).unwrap())
    }

    fn ethanol() -> Molecule {
        let mut molecule = Molecule::new();
        let c1 = molecule.add_atom(atom("C"));
        let c2 = molecule.add_atom(atom("C"));
        let o = molecule.add_atom(atom("O"));
        molecule.add_bond(c1, c2, BondOrder::Single).unwrap();
        molecule.add_bond(c2, o, BondOrder::Single).unwrap();
        molecule
    }

    #[test]
    fn add_atom_and_bond_assign_sequential_ids() {
        let molecule = ethanol();
        assert_eq!(molecule.atom_count(), 3);
        assert_eq!(molecule.bond_count(), 2);
        assert_eq!(molecule.atom(2).unwrap().element.symbol(), "O");
        assert_eq!(molecule.bond(1).unwrap().begin, 1);
    }

    #[test]
    fn add_bond_rejects_unknown_atoms() {
        let mut molecule = ethanol();
        let result = molecule.add_bond(0, 9, BondOrder::Single);
        assert_eq!(
            result,
            Err(MoleculeError::AtomOutOfRange { index: 9, count: 3 })
        );
    }

    #[test]
    fn add_bond_rejects_self_and_duplicate_bonds() {
        let mut molecule = ethanol();
        assert_eq!(
            molecule.add_bond(1, 1, BondOrder::Single),
            Err(MoleculeError::SelfBond(1))
        );
        assert_eq!(
            molecule.add_bond(1, 0, BondOrder::Double),
            Err(MoleculeError::DuplicateBond(1, 0))
        );
    }

    #[test]
    fn bond_between_is_symmetric() {
        let molecule = ethanol();
        assert_eq!(molecule.bond_between(0, 1), Some(0));
        assert_eq!(molecule.bond_between(1, 0), Some(0));
        assert_eq!(molecule.bond_between(0, 2), None);
    }

    #[test]
    fn adjacency_lists_neighbours_with_bond_ids() {
        let adjacency = ethanol().adjacency();
        assert_eq!(adjacency[0], vec![(1, 0)]);
        assert_eq!(adjacency[1], vec![(0, 0), (2, 1)]);
        assert_eq!(adjacency[2], vec![(1, 1)]);
    }
}
