use super::substructure::SubstructureError;
use crate::core::io::smiles::{self, ParsedBond, ParsedSymbol};
use crate::core::models::atom::Atom;
use crate::core::models::topology::BondOrder;
use std::collections::VecDeque;

/// Constraints a query atom places on a molecule atom. `None` means unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryAtom {
    pub atomic_number: Option<u8>,
    pub aromatic: Option<bool>,
    pub charge: Option<i8>,
}

impl QueryAtom {
    pub fn matches(&self, atom: &Atom) -> bool {
        self.atomic_number
            .is_none_or(|n| n == atom.element.atomic_number())
            && self.aromatic.is_none_or(|a| a == atom.aromatic)
            && self.charge.is_none_or(|c| c == atom.charge)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryBond {
    Any,
    SingleOrAromatic,
    Order(BondOrder),
}

impl QueryBond {
    pub fn matches(&self, order: BondOrder) -> bool {
        match self {
            Self::Any => true,
            Self::SingleOrAromatic => matches!(order, BondOrder::Single | BondOrder::Aromatic),
            Self::Order(expected) => *expected == order,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryEdge {
    pub begin: usize,
    pub end: usize,
    pub bond: QueryBond,
}

/// One step of the search plan: which query atom to place next and which of
/// its bonds to already-placed atoms must be checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlanStep {
    pub atom: usize,
    /// An earlier query atom bonded to this one, with the joining edge. Candidates
    /// are drawn from the neighbours of its image.
    pub anchor: Option<(usize, usize)>,
    /// Further edges to earlier atoms (ring closures), as `(query atom, edge)`.
    pub closures: Vec<(usize, usize)>,
}

/// A compiled substructure query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryGraph {
    source: String,
    atoms: Vec<QueryAtom>,
    edges: Vec<QueryEdge>,
    plan: Vec<PlanStep>,
}

impl QueryGraph {
    pub fn compile(source: &str) -> Result<Self, SubstructureError> {
        let graph = smiles::parse(source.trim())?;

        let mut atoms = Vec::with_capacity(graph.atoms.len());
        for parsed in &graph.atoms {
            if parsed.hydrogens.is_some() {
                return Err(SubstructureError::Unsupported {
                    feature: "hydrogen count constraints",
                    position: parsed.position,
                });
            }
            atoms.push(match parsed.symbol {
                ParsedSymbol::Any => QueryAtom {
                    atomic_number: None,
                    aromatic: None,
                    charge: parsed.charge,
                },
                ParsedSymbol::Element(element) => QueryAtom {
                    atomic_number: Some(element.atomic_number()),
                    aromatic: Some(parsed.aromatic),
                    charge: parsed.charge,
                },
            });
        }

        let edges = graph
            .edges
            .iter()
            .map(|edge| QueryEdge {
                begin: edge.begin,
                end: edge.end,
                bond: match edge.bond {
                    ParsedBond::Implicit => QueryBond::SingleOrAromatic,
                    ParsedBond::Explicit(order) => QueryBond::Order(order),
                    ParsedBond::Any => QueryBond::Any,
                },
            })
            .collect::<Vec<_>>();

        let plan = build_plan(atoms.len(), &edges);
        Ok(Self {
            source: source.to_string(),
            atoms,
            edges,
            plan,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn atoms(&self) -> &[QueryAtom] {
        &self.atoms
    }

    pub fn edges(&self) -> &[QueryEdge] {
        &self.edges
    }

    pub(crate) fn plan(&self) -> &[PlanStep] {
        &self.plan
    }
}

/// Orders query atoms breadth-first per connected component so every atom
/// except a component's first is anchored to an already-placed neighbour.
fn build_plan(atom_count: usize, edges: &[QueryEdge]) -> Vec<PlanStep> {
    let mut adjacency = vec![Vec::new(); atom_count];
    for (edge_id, edge) in edges.iter().enumerate() {
        adjacency[edge.begin].push((edge.end, edge_id));
        adjacency[edge.end].push((edge.begin, edge_id));
    }

    let mut placed = vec![false; atom_count];
    let mut plan: Vec<PlanStep> = Vec::with_capacity(atom_count);
    for root in 0..atom_count {
        if placed[root] {
            continue;
        }
        placed[root] = true;
        let mut queue = VecDeque::from([(root, None)]);
        while let Some((atom, anchor)) = queue.pop_front() {
            plan.push(PlanStep {
                atom,
                anchor,
                closures: Vec::new(),
            });
            for &(neighbour, edge) in &adjacency[atom] {
                if !placed[neighbour] {
                    placed[neighbour] = true;
                    queue.push_back((neighbour, Some((atom, edge))));
                }
            }
        }
    }

    let mut order = vec![0; atom_count];
    for (position, step) in plan.iter().enumerate() {
        order[step.atom] = position;
    }
    for position in 0..plan.len() {
        let atom = plan[position].atom;
        let anchor_edge = plan[position].anchor.map(|(_, edge)| edge);
        let closures = adjacency[atom]
            .iter()
            .filter(|&&(neighbour, edge)| order[neighbour] < position && Some(edge) != anchor_edge)
            .copied()
            .collect();
        plan[position].closures = closures;
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;

    fn atom(symbol: &str) -> Atom {
        Atom::new(Element::from_symbol(symbol).unwrap())
    }

    #[test]
    fn organic_atoms_constrain_element_and_aromaticity() {
        let query = QueryGraph::compile("c").unwrap();
        let q = query.atoms()[0];
        assert!(q.matches(&atom("C").aromatic()));
        assert!(!q.matches(&atom("C")));
        assert!(!q.matches(&atom("N").aromatic()));
        assert!(q.matches(&atom("C").aromatic().with_charge(-1)));
    }

    #[test]
    fn bracket_charge_and_wildcards() {
        let query = QueryGraph::compile("[O-]~*").unwrap();
        assert!(query.atoms()[0].matches(&atom("O").with_charge(-1)));
        assert!(!query.atoms()[0].matches(&atom("O")));
        assert!(query.atoms()[1].matches(&atom("Fe")));
        assert_eq!(query.edges()[0].bond, QueryBond::Any);
    }

    #[test]
    fn implicit_bonds_match_single_or_aromatic() {
        let bond = QueryBond::SingleOrAromatic;
        assert!(bond.matches(BondOrder::Single));
        assert!(bond.matches(BondOrder::Aromatic));
        assert!(!bond.matches(BondOrder::Double));
        assert!(QueryBond::Order(BondOrder::Double).matches(BondOrder::Double));
        assert!(QueryBond::Any.matches(BondOrder::Triple));
    }

    #[test]
    fn hydrogen_counts_are_rejected() {
        let err = QueryGraph::compile("[CH3]").unwrap_err();
        assert!(matches!(err, SubstructureError::Unsupported { position: 0, .. }));
    }

    #[test]
    fn syntax_errors_are_reported() {
        assert!(matches!(
            QueryGraph::compile("C(("),
            Err(SubstructureError::InvalidSyntax(_))
        ));
        assert!(QueryGraph::compile("").is_err());
    }

    #[test]
    fn plan_anchors_every_non_root_atom_and_records_ring_closures() {
        let query = QueryGraph::compile("C1CCC1.O").unwrap();
        let plan = query.plan();
        assert_eq!(plan.len(), 5);
        assert_eq!(plan[0].anchor, None);
        assert!(plan[1..4].iter().all(|step| step.anchor.is_some()));
        assert_eq!(plan[4].atom, 4);
        assert_eq!(plan[4].anchor, None);
        let closures: usize = plan.iter().map(|step| step.closures.len()).sum();
        assert_eq!(closures, 1);
    }
}
