use super::error::{InvalidPatternError, MatchEvaluationError};
use crate::core::matching::engine::{MappingSet, PatternEngine};
use std::fmt;

/// One compiled pattern together with the text it was compiled from.
#[derive(Debug, Clone)]
pub struct Pattern<Q> {
    pub source: String,
    pub query: Q,
}

/// An ordered, immutable collection of compiled patterns.
///
/// Results are always reported in the order the patterns were given; index `i`
/// of any result vector refers to pattern `i`. Evaluation never mutates the set,
/// so one instance is shared read-only by every worker.
pub struct PatternSet<E: PatternEngine> {
    engine: E,
    patterns: Vec<Pattern<E::Query>>,
}

impl<E: PatternEngine> fmt::Debug for PatternSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.patterns.iter().map(|p| &p.source))
            .finish()
    }
}

impl<E: PatternEngine> PatternSet<E> {
    /// Compiles every pattern, failing on the first one that does not compile.
    pub fn compile<I, S>(engine: E, sources: I) -> Result<Self, InvalidPatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = sources
            .into_iter()
            .enumerate()
            .map(|(index, source)| {
                let source = source.as_ref();
                engine
                    .compile(source)
                    .map(|query| Pattern {
                        source: source.to_string(),
                        query,
                    })
                    .map_err(|e| InvalidPatternError {
                        index,
                        pattern: source.to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { engine, patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether any pattern matches, trying them in order and stopping at the
    /// first hit.
    pub fn any_matches(&self, molecule: &E::Molecule) -> Result<bool, MatchEvaluationError> {
        let prepared = self.prepare(molecule)?;
        for (index, pattern) in self.patterns.iter().enumerate() {
            let hit = self
                .engine
                .has_mapping(&pattern.query, molecule, &prepared)
                .map_err(|e| MatchEvaluationError::new(Some(index), e.to_string()))?;
            if hit {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Unique mapping count of every pattern, zero where a pattern does not match.
    pub fn match_counts(&self, molecule: &E::Molecule) -> Result<Vec<usize>, MatchEvaluationError> {
        Ok(self
            .match_details(molecule)?
            .iter()
            .map(MappingSet::count_unique)
            .collect())
    }

    /// Every mapping of every pattern.
    pub fn match_details(
        &self,
        molecule: &E::Molecule,
    ) -> Result<Vec<MappingSet>, MatchEvaluationError> {
        let prepared = self.prepare(molecule)?;
        self.patterns
            .iter()
            .enumerate()
            .map(|(index, pattern)| {
                self.engine
                    .mappings(&pattern.query, molecule, &prepared)
                    .map_err(|e| MatchEvaluationError::new(Some(index), e.to_string()))
            })
            .collect()
    }

    fn prepare(&self, molecule: &E::Molecule) -> Result<E::Prepared, MatchEvaluationError> {
        self.engine
            .prepare(molecule)
            .map_err(|e| MatchEvaluationError::new(None, e.to_string()))
    }
}
