use super::element::Element;

/// Represents one atom of a molecular graph.
///
/// Only the properties that substructure matching and line-notation output care
/// about are stored: the element, the aromatic flag, the formal charge and an
/// explicit hydrogen count when one was written in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atom {
    /// The chemical element of the atom.
    pub element: Element,
    /// Whether the atom is part of an aromatic system.
    pub aromatic: bool,
    /// The formal charge in elementary charge units.
    pub charge: i8,
    /// Explicit hydrogen count, if the input specified one.
    pub hydrogens: Option<u8>,
}

impl Atom {
    /// Creates a neutral, aliphatic atom of the given element.
    pub fn new(element: Element) -> Self {
        Self {
            element,
            aromatic: false,
            charge: 0,
            hydrogens: None,
        }
    }

    pub fn aromatic(mut self) -> Self {
        self.aromatic = true;
        self
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_hydrogens(mut self, hydrogens: u8) -> Self {
        self.hydrogens = Some(hydrogens);
        self
    }

    /// Whether the atom can be written without brackets.
    pub fn is_bare(&self) -> bool {
        self.charge == 0
            && self.hydrogens.is_none()
            && self.element.is_organic_subset()
            && (!self.aromatic || self.element.can_be_aromatic())
    }
}
