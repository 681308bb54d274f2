use super::engine::{Mapping, MappingSet, PatternEngine};
use super::query::QueryGraph;
use crate::core::io::smiles::SmilesError;
use crate::core::models::molecule::Molecule;
use std::ops::ControlFlow;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubstructureError {
    #[error(transparent)]
    InvalidSyntax(#[from] SmilesError),
    #[error("Unsupported query feature at position {position}: {feature}")]
    Unsupported {
        feature: &'static str,
        position: usize,
    },
    #[error("Search exceeded the limit of {limit} steps")]
    SearchLimitExceeded { limit: u64 },
}

/// Neighbour lists of a molecule, built once and reused for every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetGraph {
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl TargetGraph {
    pub fn new(molecule: &Molecule) -> Self {
        Self {
            adjacency: molecule.adjacency(),
        }
    }

    fn neighbours(&self, atom: usize) -> &[(usize, usize)] {
        &self.adjacency[atom]
    }
}

/// Backtracking subgraph-monomorphism search over a compiled query.
struct Search<'a> {
    query: &'a QueryGraph,
    molecule: &'a Molecule,
    target: &'a TargetGraph,
    atom_images: Vec<usize>,
    bond_images: Vec<usize>,
    used: Vec<bool>,
    steps: u64,
    limit: Option<u64>,
}

impl<'a> Search<'a> {
    fn new(
        query: &'a QueryGraph,
        molecule: &'a Molecule,
        target: &'a TargetGraph,
        limit: Option<u64>,
    ) -> Self {
        Self {
            query,
            molecule,
            target,
            atom_images: vec![usize::MAX; query.atoms().len()],
            bond_images: vec![usize::MAX; query.edges().len()],
            used: vec![false; molecule.atom_count()],
            steps: 0,
            limit,
        }
    }

    fn run<F>(&mut self, visit: &mut F) -> Result<ControlFlow<()>, SubstructureError>
    where
        F: FnMut(Mapping) -> ControlFlow<()>,
    {
        if self.query.atoms().len() > self.molecule.atom_count()
            || self.query.edges().len() > self.molecule.bond_count()
        {
            return Ok(ControlFlow::Continue(()));
        }
        self.extend(0, visit)
    }

    fn extend<F>(&mut self, depth: usize, visit: &mut F) -> Result<ControlFlow<()>, SubstructureError>
    where
        F: FnMut(Mapping) -> ControlFlow<()>,
    {
        let query = self.query;
        let plan = query.plan();
        if depth == plan.len() {
            return Ok(visit(Mapping {
                atoms: self.atom_images.clone(),
                bonds: self.bond_images.clone(),
            }));
        }

        let step = &plan[depth];
        let candidates: Vec<(usize, Option<(usize, usize)>)> = match step.anchor {
            Some((anchor, edge)) => self
                .target
                .neighbours(self.atom_images[anchor])
                .iter()
                .map(|&(atom, bond)| (atom, Some((edge, bond))))
                .collect(),
            None => (0..self.molecule.atom_count()).map(|atom| (atom, None)).collect(),
        };

        for (candidate, anchor_bond) in candidates {
            self.tick()?;
            if self.used[candidate] || !self.accepts(depth, candidate, anchor_bond) {
                continue;
            }

            self.used[candidate] = true;
            self.atom_images[step.atom] = candidate;
            if let Some((edge, bond)) = anchor_bond {
                self.bond_images[edge] = bond;
            }
            for &(other, edge) in &step.closures {
                if let Some(bond) = self.molecule.bond_between(self.atom_images[other], candidate) {
                    self.bond_images[edge] = bond;
                }
            }

            let flow = self.extend(depth + 1, visit)?;
            self.used[candidate] = false;
            if flow.is_break() {
                return Ok(flow);
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn accepts(&self, depth: usize, candidate: usize, anchor_bond: Option<(usize, usize)>) -> bool {
        let step = &self.query.plan()[depth];
        let Some(atom) = self.molecule.atom(candidate) else {
            return false;
        };
        if !self.query.atoms()[step.atom].matches(atom) {
            return false;
        }
        if let Some((edge, bond)) = anchor_bond {
            let order = self.molecule.bonds()[bond].order;
            if !self.query.edges()[edge].bond.matches(order) {
                return false;
            }
        }
        step.closures.iter().all(|&(other, edge)| {
            self.molecule
                .bond_between(self.atom_images[other], candidate)
                .is_some_and(|bond| {
                    self.query.edges()[edge]
                        .bond
                        .matches(self.molecule.bonds()[bond].order)
                })
        })
    }

    fn tick(&mut self) -> Result<(), SubstructureError> {
        self.steps += 1;
        match self.limit {
            Some(limit) if self.steps > limit => Err(SubstructureError::SearchLimitExceeded { limit }),
            _ => Ok(()),
        }
    }
}

/// The built-in substructure engine over [`Molecule`] graphs.
///
/// Patterns use the SMILES-derived query subset: organic and bracket atoms,
/// charges, `*` wildcards, explicit and `~` bonds, branches, ring closures and
/// `.`-separated fragments. Unwritten bonds match single or aromatic bonds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstructureEngine {
    search_limit: Option<u64>,
}

impl SubstructureEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of candidate atoms tried per evaluation. Exceeding it
    /// fails that evaluation with [`SubstructureError::SearchLimitExceeded`].
    pub fn with_search_limit(mut self, limit: u64) -> Self {
        self.search_limit = Some(limit);
        self
    }

    pub fn search_limit(&self) -> Option<u64> {
        self.search_limit
    }
}

impl PatternEngine for SubstructureEngine {
    type Molecule = Molecule;
    type Query = QueryGraph;
    type Prepared = TargetGraph;
    type Error = SubstructureError;

    fn compile(&self, source: &str) -> Result<QueryGraph, SubstructureError> {
        QueryGraph::compile(source)
    }

    fn prepare(&self, molecule: &Molecule) -> Result<TargetGraph, SubstructureError> {
        Ok(TargetGraph::new(molecule))
    }

    fn has_mapping(
        &self,
        query: &QueryGraph,
        molecule: &Molecule,
        prepared: &TargetGraph,
    ) -> Result<bool, SubstructureError> {
        let mut search = Search::new(query, molecule, prepared, self.search_limit);
        let flow = search.run(&mut |_| ControlFlow::Break(()))?;
        Ok(flow.is_break())
    }

    fn mappings(
        &self,
        query: &QueryGraph,
        molecule: &Molecule,
        prepared: &TargetGraph,
    ) -> Result<MappingSet, SubstructureError> {
        let mut found = Vec::new();
        let mut search = Search::new(query, molecule, prepared, self.search_limit);
        let flow = search.run(&mut |mapping| {
            found.push(mapping);
            ControlFlow::Continue(())
        })?;
        debug_assert!(flow.is_continue(), "enumeration never stops early");
        Ok(MappingSet::new(found))
    }
}
