use super::traits::LineNotation;
use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::molecule::{Molecule, MoleculeError};
use crate::core::models::topology::BondOrder;
use std::collections::HashMap;
use std::num::ParseIntError;
use thiserror::Error;

const MAX_RING_NUMBER: u16 = 99;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid SMILES at position {position}: {kind}")]
pub struct SmilesError {
    pub position: usize,
    pub kind: SmilesErrorKind,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SmilesErrorKind {
    #[error("input is empty")]
    Empty,
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("unknown element '{0}'")]
    UnknownElement(String),
    #[error("bracket atom is never closed")]
    UnterminatedBracket,
    #[error("branch opened without a preceding atom")]
    BranchWithoutAtom,
    #[error("')' without a matching '('")]
    UnbalancedBranch,
    #[error("branch is never closed")]
    UnclosedBranch,
    #[error("bond or ring closure without a preceding atom")]
    BondWithoutAtom,
    #[error("two consecutive bond symbols")]
    ConsecutiveBonds,
    #[error("bond symbol is not followed by an atom")]
    DanglingBond,
    #[error("invalid ring closure number")]
    InvalidRingNumber,
    #[error("ring closure {0} is never closed")]
    UnclosedRing(u16),
    #[error("ring closure {0} would bond an atom to itself or to an existing neighbour")]
    InvalidRingClosure(u16),
    #[error("ring closure {0} has conflicting bond symbols")]
    RingBondMismatch(u16),
    #[error("value out of range in bracket atom")]
    ValueOutOfRange,
    #[error("'{0}' is only valid in query patterns")]
    QueryFeature(char),
    #[error(transparent)]
    Graph(#[from] MoleculeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParsedSymbol {
    Element(Element),
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParsedAtom {
    pub symbol: ParsedSymbol,
    pub aromatic: bool,
    pub charge: Option<i8>,
    pub hydrogens: Option<u8>,
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParsedBond {
    Implicit,
    Explicit(BondOrder),
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParsedEdge {
    pub begin: usize,
    pub end: usize,
    pub bond: ParsedBond,
    pub position: usize,
}

/// The syntax graph shared by molecule input and query compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ParsedGraph {
    pub atoms: Vec<ParsedAtom>,
    pub edges: Vec<ParsedEdge>,
}

pub(crate) fn parse(input: &str) -> Result<ParsedGraph, SmilesError> {
    Parser::new(input).run()
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    graph: ParsedGraph,
    previous: Option<usize>,
    branches: Vec<(usize, usize)>,
    pending_bond: Option<(ParsedBond, usize)>,
    open_rings: HashMap<u16, (usize, ParsedBond, usize)>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            graph: ParsedGraph::default(),
            previous: None,
            branches: Vec::new(),
            pending_bond: None,
            open_rings: HashMap::new(),
        }
    }

    fn error(&self, position: usize, kind: SmilesErrorKind) -> SmilesError {
        SmilesError { position, kind }
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }

    fn run(mut self) -> Result<ParsedGraph, SmilesError> {
        if self.input.trim().is_empty() {
            return Err(self.error(0, SmilesErrorKind::Empty));
        }
        let input = self.input;
        let bytes = input.as_bytes();

        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'(' => {
                    let atom = self
                        .previous
                        .ok_or_else(|| self.error(self.pos, SmilesErrorKind::BranchWithoutAtom))?;
                    self.reject_pending_bond()?;
                    self.branches.push((atom, self.pos));
                    self.pos += 1;
                }
                b')' => {
                    self.reject_pending_bond()?;
                    let (atom, _) = self
                        .branches
                        .pop()
                        .ok_or_else(|| self.error(self.pos, SmilesErrorKind::UnbalancedBranch))?;
                    self.previous = Some(atom);
                    self.pos += 1;
                }
                b'.' => {
                    self.reject_pending_bond()?;
                    self.previous = None;
                    self.pos += 1;
                }
                c @ (b'-' | b'=' | b'#' | b':' | b'~' | b'/' | b'\\') => {
                    if self.previous.is_none() {
                        return Err(self.error(self.pos, SmilesErrorKind::BondWithoutAtom));
                    }
                    if self.pending_bond.is_some() {
                        return Err(self.error(self.pos, SmilesErrorKind::ConsecutiveBonds));
                    }
                    let bond = match c {
                        b'=' => ParsedBond::Explicit(BondOrder::Double),
                        b'#' => ParsedBond::Explicit(BondOrder::Triple),
                        b':' => ParsedBond::Explicit(BondOrder::Aromatic),
                        b'~' => ParsedBond::Any,
                        _ => ParsedBond::Explicit(BondOrder::Single),
                    };
                    self.pending_bond = Some((bond, self.pos));
                    self.pos += 1;
                }
                b'0'..=b'9' | b'%' => self.ring_closure()?,
                b'[' => {
                    let atom = self.bracket_atom()?;
                    self.attach(atom);
                }
                b'*' => {
                    let atom = ParsedAtom {
                        symbol: ParsedSymbol::Any,
                        aromatic: false,
                        charge: None,
                        hydrogens: None,
                        position: self.pos,
                    };
                    self.pos += 1;
                    self.attach(atom);
                }
                _ => {
                    let atom = self.bare_atom()?;
                    self.attach(atom);
                }
            }
        }

        self.reject_pending_bond()?;
        if let Some(&(_, position)) = self.branches.last() {
            return Err(self.error(position, SmilesErrorKind::UnclosedBranch));
        }
        if let Some((&number, &(_, _, position))) =
            self.open_rings.iter().min_by_key(|(number, _)| **number)
        {
            return Err(self.error(position, SmilesErrorKind::UnclosedRing(number)));
        }
        // only component separators
        if self.graph.atoms.is_empty() {
            return Err(self.error(0, SmilesErrorKind::Empty));
        }
        Ok(self.graph)
    }

    fn reject_pending_bond(&self) -> Result<(), SmilesError> {
        match self.pending_bond {
            Some((_, position)) => Err(self.error(position, SmilesErrorKind::DanglingBond)),
            None => Ok(()),
        }
    }

    fn attach(&mut self, atom: ParsedAtom) {
        let index = self.graph.atoms.len();
        self.graph.atoms.push(atom);
        if let Some(previous) = self.previous {
            let (bond, position) = self
                .pending_bond
                .take()
                .unwrap_or((ParsedBond::Implicit, atom.position));
            self.graph.edges.push(ParsedEdge {
                begin: previous,
                end: index,
                bond,
                position,
            });
        }
        self.previous = Some(index);
    }

    fn bare_atom(&mut self) -> Result<ParsedAtom, SmilesError> {
        let start = self.pos;
        let input = self.input;
        let rest = &input[start..];

        let (element, aromatic, len) = if rest.starts_with("Cl") || rest.starts_with("Br") {
            (Element::from_symbol(&rest[..2]), false, 2)
        } else {
            match self.current_char() {
                'B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I' => {
                    (Element::from_symbol(&rest[..1]), false, 1)
                }
                c @ ('b' | 'c' | 'n' | 'o' | 'p' | 's') => {
                    (Element::from_aromatic_symbol(&rest[..c.len_utf8()]), true, 1)
                }
                c => return Err(self.error(start, SmilesErrorKind::UnexpectedCharacter(c))),
            }
        };

        let element = element.ok_or_else(|| {
            self.error(
                start,
                SmilesErrorKind::UnknownElement(rest[..len].to_string()),
            )
        })?;
        self.pos += len;
        Ok(ParsedAtom {
            symbol: ParsedSymbol::Element(element),
            aromatic,
            charge: None,
            hydrogens: None,
            position: start,
        })
    }

    fn bracket_atom(&mut self) -> Result<ParsedAtom, SmilesError> {
        let start = self.pos;
        let body_start = start + 1;
        let close = self.input[body_start..]
            .find(']')
            .map(|offset| body_start + offset)
            .ok_or_else(|| self.error(start, SmilesErrorKind::UnterminatedBracket))?;
        let body = &self.input[body_start..close];
        let bytes = body.as_bytes();
        let mut i = 0;
        let number_at = |i: usize| {
            leading_number(&body[i..])
                .map_err(|_| self.error(body_start + i, SmilesErrorKind::ValueOutOfRange))
        };

        // isotope labels are accepted and ignored
        i += number_at(i)?.1;

        let (symbol, aromatic, len) = bracket_symbol(&body[i..]).ok_or_else(|| {
            self.error(
                body_start + i,
                SmilesErrorKind::UnknownElement(body[i..].chars().take(2).collect()),
            )
        })?;
        i += len;

        while i < bytes.len() && bytes[i] == b'@' {
            i += 1;
        }

        let mut hydrogens = None;
        if i < bytes.len() && bytes[i] == b'H' {
            i += 1;
            let (count, len) = number_at(i)?;
            let count = count.unwrap_or(1);
            hydrogens = Some(u8::try_from(count).map_err(|_| {
                self.error(body_start + i, SmilesErrorKind::ValueOutOfRange)
            })?);
            i += len;
        }

        let mut charge = None;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            let sign_byte = bytes[i];
            let sign: i64 = if sign_byte == b'+' { 1 } else { -1 };
            i += 1;
            let (digits, len) = number_at(i)?;
            let magnitude = match digits {
                Some(value) => {
                    i += len;
                    value
                }
                None => {
                    let mut repeated = 1;
                    while i < bytes.len() && bytes[i] == sign_byte {
                        repeated += 1;
                        i += 1;
                    }
                    repeated
                }
            };
            let value = i8::try_from(sign * i64::from(magnitude))
                .map_err(|_| self.error(body_start + i, SmilesErrorKind::ValueOutOfRange))?;
            charge = Some(value);
        }

        // atom classes are accepted and ignored
        if i < bytes.len() && bytes[i] == b':' {
            i += 1;
            i += number_at(i)?.1;
        }

        if i < bytes.len() {
            let c = body[i..].chars().next().unwrap_or('\0');
            return Err(self.error(body_start + i, SmilesErrorKind::UnexpectedCharacter(c)));
        }

        self.pos = close + 1;
        Ok(ParsedAtom {
            symbol,
            aromatic,
            charge,
            hydrogens,
            position: start,
        })
    }

    fn ring_closure(&mut self) -> Result<(), SmilesError> {
        let start = self.pos;
        let input = self.input;
        let bytes = input.as_bytes();
        let number = if bytes[start] == b'%' {
            let digits = bytes.get(start + 1..start + 3).filter(|d| {
                d.iter().all(u8::is_ascii_digit)
            });
            let Some(digits) = digits else {
                return Err(self.error(start, SmilesErrorKind::InvalidRingNumber));
            };
            self.pos += 3;
            u16::from(digits[0] - b'0') * 10 + u16::from(digits[1] - b'0')
        } else {
            self.pos += 1;
            u16::from(bytes[start] - b'0')
        };
        if number > MAX_RING_NUMBER {
            return Err(self.error(start, SmilesErrorKind::InvalidRingNumber));
        }

        let atom = self
            .previous
            .ok_or_else(|| self.error(start, SmilesErrorKind::BondWithoutAtom))?;
        let written = self.pending_bond.take().map(|(bond, _)| bond);

        match self.open_rings.remove(&number) {
            Some((other, opening, _)) => {
                let bond = match (opening, written) {
                    (ParsedBond::Implicit, None) => ParsedBond::Implicit,
                    (ParsedBond::Implicit, Some(bond)) => bond,
                    (bond, None) => bond,
                    (a, Some(b)) if a == b => a,
                    _ => {
                        return Err(
                            self.error(start, SmilesErrorKind::RingBondMismatch(number))
                        );
                    }
                };
                let already_bonded = self.graph.edges.iter().any(|edge| {
                    (edge.begin == other && edge.end == atom)
                        || (edge.begin == atom && edge.end == other)
                });
                if other == atom || already_bonded {
                    return Err(self.error(start, SmilesErrorKind::InvalidRingClosure(number)));
                }
                self.graph.edges.push(ParsedEdge {
                    begin: other,
                    end: atom,
                    bond,
                    position: start,
                });
            }
            None => {
                self.open_rings.insert(
                    number,
                    (atom, written.unwrap_or(ParsedBond::Implicit), start),
                );
            }
        }
        Ok(())
    }
}

/// Reads the digits at the start of `text` as `(value, digit count)`.
fn leading_number(text: &str) -> Result<(Option<u32>, usize), ParseIntError> {
    let len = text.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return Ok((None, 0));
    }
    Ok((Some(text[..len].parse()?), len))
}

fn bracket_symbol(text: &str) -> Option<(ParsedSymbol, bool, usize)> {
    let mut chars = text.chars();
    let first = chars.next()?;
    let second = chars.next();

    if first == '*' {
        return Some((ParsedSymbol::Any, false, 1));
    }
    if first.is_ascii_uppercase() {
        if let Some(second) = second.filter(char::is_ascii_lowercase) {
            let two = &text[..1 + second.len_utf8()];
            if let Some(element) = Element::from_symbol(two) {
                return Some((ParsedSymbol::Element(element), false, two.len()));
            }
        }
        return Element::from_symbol(&text[..1])
            .map(|element| (ParsedSymbol::Element(element), false, 1));
    }
    if first.is_ascii_lowercase() {
        if let Some(second) = second.filter(char::is_ascii_lowercase) {
            let two = &text[..1 + second.len_utf8()];
            if let Some(element) = Element::from_aromatic_symbol(two) {
                return Some((ParsedSymbol::Element(element), true, two.len()));
            }
        }
        return Element::from_aromatic_symbol(&text[..1])
            .map(|element| (ParsedSymbol::Element(element), true, 1));
    }
    None
}

/// Reads a molecule from its SMILES representation.
///
/// Query-only features (`*` atoms and `~` bonds) are rejected. An unwritten bond
/// between two aromatic atoms is read as aromatic, otherwise as single.
pub fn read(input: &str) -> Result<Molecule, SmilesError> {
    let graph = parse(input)?;
    let mut molecule = Molecule::new();

    for parsed in &graph.atoms {
        let ParsedSymbol::Element(element) = parsed.symbol else {
            return Err(SmilesError {
                position: parsed.position,
                kind: SmilesErrorKind::QueryFeature('*'),
            });
        };
        molecule.add_atom(Atom {
            element,
            aromatic: parsed.aromatic,
            charge: parsed.charge.unwrap_or(0),
            hydrogens: parsed.hydrogens,
        });
    }

    for edge in &graph.edges {
        let order = match edge.bond {
            ParsedBond::Explicit(order) => order,
            ParsedBond::Implicit => {
                if graph.atoms[edge.begin].aromatic && graph.atoms[edge.end].aromatic {
                    BondOrder::Aromatic
                } else {
                    BondOrder::Single
                }
            }
            ParsedBond::Any => {
                return Err(SmilesError {
                    position: edge.position,
                    kind: SmilesErrorKind::QueryFeature('~'),
                });
            }
        };
        molecule
            .add_bond(edge.begin, edge.end, order)
            .map_err(|e| SmilesError {
                position: edge.position,
                kind: e.into(),
            })?;
    }

    Ok(molecule)
}

enum Emit {
    Atom { atom: usize, via: Option<usize> },
    Open,
    Close,
}

/// Writes a molecule as a normalized SMILES string.
///
/// Atoms are emitted in depth-first order starting from the lowest unvisited
/// atom index, ring closures use the lowest free digit, and brackets are only
/// written where the atom cannot be expressed bare.
pub fn write(molecule: &Molecule) -> String {
    let adjacency = molecule.adjacency();
    let atom_count = molecule.atom_count();
    let mut visited = vec![false; atom_count];
    let mut bond_seen = vec![false; molecule.bond_count()];
    let mut children: Vec<Vec<(usize, usize)>> = vec![Vec::new(); atom_count];
    let mut ring_bonds: Vec<Vec<usize>> = vec![Vec::new(); atom_count];
    let mut roots = Vec::new();

    for root in 0..atom_count {
        if visited[root] {
            continue;
        }
        roots.push(root);
        visited[root] = true;
        let mut stack = vec![(root, 0usize)];
        while let Some(top) = stack.last_mut() {
            let (atom, cursor) = *top;
            if cursor >= adjacency[atom].len() {
                stack.pop();
                continue;
            }
            top.1 += 1;
            let (neighbour, bond) = adjacency[atom][cursor];
            if bond_seen[bond] {
                continue;
            }
            bond_seen[bond] = true;
            if visited[neighbour] {
                ring_bonds[neighbour].push(bond);
                ring_bonds[atom].push(bond);
            } else {
                visited[neighbour] = true;
                children[atom].push((bond, neighbour));
                stack.push((neighbour, 0));
            }
        }
    }

    let atoms = molecule.atoms();
    let bonds = molecule.bonds();
    let mut out = String::new();
    let mut open_digits: HashMap<usize, u16> = HashMap::new();
    let mut digit_in_use = [false; MAX_RING_NUMBER as usize + 1];

    for (component, &root) in roots.iter().enumerate() {
        if component > 0 {
            out.push('.');
        }
        let mut actions = vec![Emit::Atom {
            atom: root,
            via: None,
        }];
        while let Some(action) = actions.pop() {
            let (atom, via) = match action {
                Emit::Open => {
                    out.push('(');
                    continue;
                }
                Emit::Close => {
                    out.push(')');
                    continue;
                }
                Emit::Atom { atom, via } => (atom, via),
            };

            if let Some(bond) = via {
                let bond = &bonds[bond];
                out.push_str(bond_symbol(
                    bond.order,
                    atoms[bond.begin].aromatic && atoms[bond.end].aromatic,
                ));
            }
            write_atom(&mut out, &atoms[atom]);

            for &bond_id in &ring_bonds[atom] {
                let digit = match open_digits.remove(&bond_id) {
                    Some(digit) => {
                        let bond = &bonds[bond_id];
                        out.push_str(bond_symbol(
                            bond.order,
                            atoms[bond.begin].aromatic && atoms[bond.end].aromatic,
                        ));
                        digit_in_use[digit as usize] = false;
                        digit
                    }
                    None => {
                        let digit = (1..=MAX_RING_NUMBER)
                            .find(|d| !digit_in_use[*d as usize])
                            .unwrap_or(MAX_RING_NUMBER);
                        digit_in_use[digit as usize] = true;
                        open_digits.insert(bond_id, digit);
                        digit
                    }
                };
                if digit < 10 {
                    out.push(char::from(b'0' + digit as u8));
                } else {
                    out.push_str(&format!("%{digit:02}"));
                }
            }

            let branch_count = children[atom].len();
            for (k, &(bond, child)) in children[atom].iter().enumerate().rev() {
                let step = Emit::Atom {
                    atom: child,
                    via: Some(bond),
                };
                if k + 1 == branch_count {
                    actions.push(step);
                } else {
                    actions.push(Emit::Close);
                    actions.push(step);
                    actions.push(Emit::Open);
                }
            }
        }
    }

    out
}

fn bond_symbol(order: BondOrder, between_aromatic_atoms: bool) -> &'static str {
    match (order, between_aromatic_atoms) {
        (BondOrder::Single, true) => "-",
        (BondOrder::Aromatic, true) => "",
        (order, _) => order.symbol(),
    }
}

fn write_atom(out: &mut String, atom: &Atom) {
    let symbol = if atom.aromatic {
        atom.element.symbol().to_lowercase()
    } else {
        atom.element.symbol().to_string()
    };
    if atom.is_bare() {
        out.push_str(&symbol);
        return;
    }
    out.push('[');
    out.push_str(&symbol);
    match atom.hydrogens {
        Some(0) | None => {}
        Some(1) => out.push('H'),
        Some(n) => out.push_str(&format!("H{n}")),
    }
    match atom.charge {
        0 => {}
        1 => out.push('+'),
        -1 => out.push('-'),
        c if c > 0 => out.push_str(&format!("+{c}")),
        c => out.push_str(&format!("-{}", -(c as i16))),
    }
    out.push(']');
}

impl Molecule {
    pub fn from_smiles(input: &str) -> Result<Self, SmilesError> {
        read(input)
    }

    pub fn to_smiles(&self) -> String {
        write(self)
    }
}

/// The SMILES line notation.
pub struct Smiles;

impl LineNotation for Smiles {
    type Error = SmilesError;

    fn parse(text: &str) -> Result<Molecule, Self::Error> {
        read(text)
    }

    fn write(molecule: &Molecule) -> String {
        write(molecule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_kind(input: &str) -> SmilesErrorKind {
        read(input).unwrap_err().kind
    }

    #[test]
    fn reads_branches_and_explicit_bonds() {
        let acetic_acid = read("CC(=O)O").unwrap();
        assert_eq!(acetic_acid.atom_count(), 4);
        assert_eq!(acetic_acid.bond_count(), 3);
        let carbonyl = acetic_acid.bond_between(1, 2).unwrap();
        assert_eq!(acetic_acid.bonds()[carbonyl].order, BondOrder::Double);
        assert!(acetic_acid.bond_between(1, 3).is_some());
    }

    #[test]
    fn aromatic_ring_closure_produces_aromatic_bonds() {
        let benzene = read("c1ccccc1").unwrap();
        assert_eq!(benzene.atom_count(), 6);
        assert_eq!(benzene.bond_count(), 6);
        assert!(benzene.bond_between(0, 5).is_some());
        assert!(benzene
            .bonds()
            .iter()
            .all(|bond| bond.order == BondOrder::Aromatic));
        assert!(benzene.atoms().iter().all(|atom| atom.aromatic));
    }

    #[test]
    fn reads_two_letter_and_bracket_atoms() {
        let molecule = read("ClC[NH3+].[O-2]").unwrap();
        assert_eq!(molecule.atom(0).unwrap().element.symbol(), "Cl");
        let ammonium = molecule.atom(2).unwrap();
        assert_eq!(ammonium.element.symbol(), "N");
        assert_eq!(ammonium.hydrogens, Some(3));
        assert_eq!(ammonium.charge, 1);
        assert_eq!(molecule.atom(3).unwrap().charge, -2);
        assert_eq!(molecule.bond_count(), 2);
    }

    #[test]
    fn repeated_charge_signs_accumulate() {
        let molecule = read("[Fe++]").unwrap();
        assert_eq!(molecule.atom(0).unwrap().charge, 2);
    }

    #[test]
    fn percent_ring_numbers_are_supported() {
        let molecule = read("C%12CCC%12").unwrap();
        assert_eq!(molecule.bond_count(), 4);
        assert!(molecule.bond_between(0, 3).is_some());
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(error_kind(""), SmilesErrorKind::Empty);
        assert_eq!(error_kind("C1CC"), SmilesErrorKind::UnclosedRing(1));
        assert_eq!(error_kind("CC)"), SmilesErrorKind::UnbalancedBranch);
        assert_eq!(error_kind("C(C"), SmilesErrorKind::UnclosedBranch);
        assert_eq!(error_kind("C="), SmilesErrorKind::DanglingBond);
        assert_eq!(error_kind("=C"), SmilesErrorKind::BondWithoutAtom);
        assert_eq!(error_kind("C==C"), SmilesErrorKind::ConsecutiveBonds);
        assert_eq!(error_kind("[C"), SmilesErrorKind::UnterminatedBracket);
        assert_eq!(
            error_kind("[Xx]"),
            SmilesErrorKind::UnknownElement("Xx".to_string())
        );
        assert_eq!(error_kind("CX"), SmilesErrorKind::UnexpectedCharacter('X'));
        assert_eq!(error_kind("C11"), SmilesErrorKind::InvalidRingClosure(1));
    }

    #[test]
    fn oversized_bracket_numbers_are_rejected() {
        for input in ["[C+4294967295]", "[NH99999999999]", "[C-99999999999]", "[NH300]"] {
            assert_eq!(error_kind(input), SmilesErrorKind::ValueOutOfRange, "{input}");
        }
        assert_eq!(error_kind("[C+200]"), SmilesErrorKind::ValueOutOfRange);
        assert_eq!(read("[NH4+]").unwrap().to_smiles(), "[NH4+]");
    }

    #[test]
    fn separators_alone_are_empty_input() {
        assert_eq!(error_kind(".."), SmilesErrorKind::Empty);
        assert_eq!(error_kind("."), SmilesErrorKind::Empty);
        assert_eq!(read("C.C").unwrap().atom_count(), 2);
    }

    #[test]
    fn error_reports_position() {
        let err = read("CCC(C").unwrap_err();
        assert_eq!(err.position, 3);
    }

    #[test]
    fn read_rejects_query_features() {
        assert_eq!(error_kind("C*"), SmilesErrorKind::QueryFeature('*'));
        assert_eq!(error_kind("C~C"), SmilesErrorKind::QueryFeature('~'));
    }

    #[test]
    fn parse_keeps_query_features() {
        let graph = parse("*~[C+]").unwrap();
        assert_eq!(graph.atoms[0].symbol, ParsedSymbol::Any);
        assert_eq!(graph.edges[0].bond, ParsedBond::Any);
        assert_eq!(graph.atoms[1].charge, Some(1));
    }

    #[test]
    fn write_reproduces_simple_inputs() {
        for input in ["CC(=O)O", "c1ccccc1", "[NH4+]", "[Na+].[Cl-]", "C#N", "C1CC1"] {
            assert_eq!(write(&read(input).unwrap()), input, "input {input}");
        }
    }

    #[test]
    fn write_normalizes_redundant_notation() {
        assert_eq!(write(&read("C-C-O").unwrap()), "CCO");
        assert_eq!(write(&read("[CH4]").unwrap()), "[CH4]");
        assert_eq!(write(&read("OC(C)=O").unwrap()), "OC(C)=O");
    }

    #[test]
    fn write_fused_rings_reuses_freed_digits() {
        let naphthalene = read("c1ccc2ccccc2c1").unwrap();
        let written = write(&naphthalene);
        let reread = read(&written).unwrap();
        assert_eq!(reread.atom_count(), 10);
        assert_eq!(reread.bond_count(), 11);
    }
}
