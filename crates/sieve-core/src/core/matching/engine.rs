use itertools::Itertools;
use std::error::Error;

/// One concrete alignment of a query onto a molecule.
///
/// `atoms[i]` is the molecule atom matched by query atom `i`; `bonds[j]` is the
/// molecule bond matched by query bond `j`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub atoms: Vec<usize>,
    pub bonds: Vec<usize>,
}

/// Every mapping of one query onto one molecule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingSet {
    mappings: Vec<Mapping>,
}

impl MappingSet {
    pub fn new(mappings: Vec<Mapping>) -> Self {
        Self { mappings }
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn at_least(&self, n: usize) -> bool {
        self.mappings.len() >= n
    }

    /// Counts mappings that cover structurally distinct atom sets.
    ///
    /// Symmetric queries map onto the same atoms in several permutations; those
    /// count once.
    pub fn count_unique(&self) -> usize {
        self.mappings
            .iter()
            .map(|mapping| mapping.atoms.iter().copied().sorted_unstable().collect_vec())
            .unique()
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mapping> {
        self.mappings.iter()
    }

    /// All molecule atoms taking part in any mapping.
    pub fn atoms(&self) -> impl Iterator<Item = usize> + '_ {
        self.mappings.iter().flat_map(|m| m.atoms.iter().copied())
    }

    /// All molecule bonds taking part in any mapping.
    pub fn bonds(&self) -> impl Iterator<Item = usize> + '_ {
        self.mappings.iter().flat_map(|m| m.bonds.iter().copied())
    }
}

impl IntoIterator for MappingSet {
    type Item = Mapping;
    type IntoIter = std::vec::IntoIter<Mapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.mappings.into_iter()
    }
}

/// A structural-pattern compiler and evaluator.
///
/// Compiled queries are shared read-only between worker threads, so they must
/// be `Send + Sync`. The prepared form of a molecule is built once per
/// evaluation call and lives only for that call.
pub trait PatternEngine: Send + Sync + 'static {
    /// The molecule representation the engine evaluates.
    type Molecule: Send + 'static;
    /// A compiled query.
    type Query: Send + Sync + 'static;
    /// Per-molecule matching state, prepared once and reused across queries.
    type Prepared;
    /// The error type for compilation and evaluation failures.
    type Error: Error + Send + Sync + 'static;

    /// Compiles one pattern string.
    fn compile(&self, source: &str) -> Result<Self::Query, Self::Error>;

    /// Prepares a molecule for evaluation against any number of queries.
    fn prepare(&self, molecule: &Self::Molecule) -> Result<Self::Prepared, Self::Error>;

    /// Whether the query has at least one mapping onto the molecule.
    ///
    /// Implementations should stop searching at the first mapping found.
    fn has_mapping(
        &self,
        query: &Self::Query,
        molecule: &Self::Molecule,
        prepared: &Self::Prepared,
    ) -> Result<bool, Self::Error>;

    /// Enumerates every mapping of the query onto the molecule.
    fn mappings(
        &self,
        query: &Self::Query,
        molecule: &Self::Molecule,
        prepared: &Self::Prepared,
    ) -> Result<MappingSet, Self::Error>;
}
