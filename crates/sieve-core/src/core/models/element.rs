use phf::phf_map;
use std::fmt;

static ATOMIC_NUMBERS: phf::Map<&'static str, u8> = phf_map! {
    "H" => 1, "He" => 2, "Li" => 3, "Be" => 4, "B" => 5, "C" => 6, "N" => 7, "O" => 8,
    "F" => 9, "Ne" => 10, "Na" => 11, "Mg" => 12, "Al" => 13, "Si" => 14, "P" => 15,
    "S" => 16, "Cl" => 17, "Ar" => 18, "K" => 19, "Ca" => 20, "Sc" => 21, "Ti" => 22,
    "V" => 23, "Cr" => 24, "Mn" => 25, "Fe" => 26, "Co" => 27, "Ni" => 28, "Cu" => 29,
    "Zn" => 30, "Ga" => 31, "Ge" => 32, "As" => 33, "Se" => 34, "Br" => 35, "Kr" => 36,
    "Rb" => 37, "Sr" => 38, "Y" => 39, "Zr" => 40, "Nb" => 41, "Mo" => 42, "Tc" => 43,
    "Ru" => 44, "Rh" => 45, "Pd" => 46, "Ag" => 47, "Cd" => 48, "In" => 49, "Sn" => 50,
    "Sb" => 51, "Te" => 52, "I" => 53, "Xe" => 54, "Cs" => 55, "Ba" => 56, "Pt" => 78,
    "Au" => 79, "Hg" => 80, "Tl" => 81, "Pb" => 82, "Bi" => 83,
};

/// Elements that may be written without brackets.
const ORGANIC_SUBSET: [&str; 10] = ["B", "C", "N", "O", "P", "S", "F", "Cl", "Br", "I"];

/// Elements that may carry a lowercase (aromatic) symbol.
const AROMATIC_CAPABLE: [&str; 8] = ["B", "C", "N", "O", "P", "S", "Se", "As"];

/// A chemical element, identified by its canonical symbol and atomic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Element {
    symbol: &'static str,
    number: u8,
}

impl Element {
    /// Looks up an element by its case-sensitive symbol (e.g. `"Cl"`).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        ATOMIC_NUMBERS
            .get_entry(symbol)
            .map(|(symbol, number)| Self {
                symbol: *symbol,
                number: *number,
            })
    }

    /// Looks up an element from a lowercase aromatic symbol (e.g. `"c"`, `"se"`).
    pub fn from_aromatic_symbol(symbol: &str) -> Option<Self> {
        let mut chars = symbol.chars();
        let first = chars.next()?;
        if !first.is_ascii_lowercase() {
            return None;
        }
        let capitalized: String = first.to_ascii_uppercase().to_string() + chars.as_str();
        Self::from_symbol(&capitalized).filter(|e| e.can_be_aromatic())
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    pub fn atomic_number(&self) -> u8 {
        self.number
    }

    pub fn is_organic_subset(&self) -> bool {
        ORGANIC_SUBSET.contains(&self.symbol)
    }

    pub fn can_be_aromatic(&self) -> bool {
        AROMATIC_CAPABLE.contains(&self.symbol)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_symbol_is_case_sensitive() {
        assert_eq!(Element::from_symbol("Cl").unwrap().atomic_number(), 17);
        assert!(Element::from_symbol("CL").is_none());
        assert!(Element::from_symbol("cl").is_none());
        assert!(Element::from_symbol("Xx").is_none());
    }

    #[test]
    fn from_aromatic_symbol_only_accepts_aromatic_capable_elements() {
        assert_eq!(Element::from_aromatic_symbol("c").unwrap().symbol(), "C");
        assert_eq!(Element::from_aromatic_symbol("se").unwrap().symbol(), "Se");
        assert!(Element::from_aromatic_symbol("f").is_none());
        assert!(Element::from_aromatic_symbol("C").is_none());
    }

    #[test]
    fn organic_subset_membership() {
        assert!(Element::from_symbol("Br").unwrap().is_organic_subset());
        assert!(!Element::from_symbol("Na").unwrap().is_organic_subset());
    }
}
