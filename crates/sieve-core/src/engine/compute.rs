use super::config::OutputMode;
use super::pattern_set::PatternSet;
use super::record::{MatchResult, Payload, RowOutcome};
use crate::core::matching::engine::{MappingSet, PatternEngine};
use itertools::Itertools;
use tracing::{debug, warn};

/// Evaluates one record's payload against the pattern set.
///
/// Runs on a worker thread. Evaluation errors become [`RowOutcome::Failed`];
/// records without a usable molecule become [`RowOutcome::Missing`].
pub(crate) fn evaluate<E: PatternEngine>(
    patterns: &PatternSet<E>,
    payload: &Payload<E::Molecule>,
    mode: OutputMode,
    index: u64,
) -> RowOutcome {
    let molecule = match payload {
        Payload::Molecule(molecule) => molecule,
        Payload::Missing => {
            debug!(index, "Record has no molecule; skipping evaluation");
            return RowOutcome::Missing;
        }
        Payload::Unreadable { reason } => {
            debug!(index, %reason, "Record molecule is unreadable; skipping evaluation");
            return RowOutcome::Missing;
        }
    };

    let result = if mode.needs_details() {
        patterns
            .match_details(molecule)
            .map(|details| summarize(&details, mode))
    } else {
        patterns.any_matches(molecule).map(MatchResult::classified)
    };

    match result {
        Ok(result) => RowOutcome::Evaluated(result),
        Err(e) => {
            warn!(index, error = %e, "Evaluation failed; routing record as unmatched");
            RowOutcome::Failed(e)
        }
    }
}

fn summarize(details: &[MappingSet], mode: OutputMode) -> MatchResult {
    if !details.iter().any(|set| set.at_least(1)) {
        return MatchResult::classified(false);
    }
    MatchResult {
        matched: true,
        counts: Some(details.iter().map(MappingSet::count_unique).collect()),
        atoms: mode.positions.then(|| {
            details
                .iter()
                .flat_map(MappingSet::atoms)
                .sorted_unstable()
                .dedup()
                .collect_vec()
        }),
        bonds: mode.positions.then(|| {
            details
                .iter()
                .flat_map(MappingSet::bonds)
                .sorted_unstable()
                .dedup()
                .collect_vec()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matching::substructure::SubstructureEngine;
    use crate::core::models::molecule::Molecule;

    fn set(patterns: &[&str]) -> PatternSet<SubstructureEngine> {
        PatternSet::compile(SubstructureEngine::new(), patterns).unwrap()
    }

    fn payload(smiles: &str) -> Payload<Molecule> {
        Payload::Molecule(Molecule::from_smiles(smiles).unwrap())
    }

    const PLAIN: OutputMode = OutputMode {
        counts: false,
        positions: false,
    };
    const COUNTS: OutputMode = OutputMode {
        counts: true,
        positions: false,
    };
    const POSITIONS: OutputMode = OutputMode {
        counts: false,
        positions: true,
    };

    #[test]
    fn plain_mode_only_classifies() {
        let outcome = evaluate(&set(&["O"]), &payload("CCO"), PLAIN, 0);
        assert_eq!(outcome, RowOutcome::Evaluated(MatchResult::classified(true)));
        let outcome = evaluate(&set(&["O"]), &payload("CC"), PLAIN, 0);
        assert_eq!(outcome, RowOutcome::Evaluated(MatchResult::classified(false)));
    }

    #[test]
    fn missing_and_unreadable_payloads_are_not_evaluated() {
        let patterns = set(&["O"]);
        assert_eq!(evaluate(&patterns, &Payload::Missing, COUNTS, 1), RowOutcome::Missing);
        let unreadable = Payload::Unreadable {
            reason: "bad ring".to_string(),
        };
        assert_eq!(evaluate(&patterns, &unreadable, PLAIN, 1), RowOutcome::Missing);
    }

    #[test]
    fn counts_are_attached_only_to_matched_records() {
        let patterns = set(&["O", "N"]);
        let RowOutcome::Evaluated(result) = evaluate(&patterns, &payload("OCCO"), COUNTS, 0) else {
            panic!("expected evaluation");
        };
        assert!(result.matched);
        assert_eq!(result.counts, Some(vec![2, 0]));
        assert_eq!(result.atoms, None);

        let RowOutcome::Evaluated(result) = evaluate(&patterns, &payload("CC"), COUNTS, 0) else {
            panic!("expected evaluation");
        };
        assert_eq!(result, MatchResult::classified(false));
    }

    #[test]
    fn positions_include_counts_and_merge_ids() {
        let patterns = set(&["C=O", "O"]);
        let RowOutcome::Evaluated(result) =
            evaluate(&patterns, &payload("CC(=O)C"), POSITIONS, 0)
        else {
            panic!("expected evaluation");
        };
        assert_eq!(result.counts, Some(vec![1, 1]));
        assert_eq!(result.atoms, Some(vec![1, 2]));
        assert_eq!(result.bonds, Some(vec![1]));
    }

    #[test]
    fn evaluation_errors_become_failed_outcomes() {
        let patterns =
            PatternSet::compile(SubstructureEngine::new().with_search_limit(1), ["CC"]).unwrap();
        let outcome = evaluate(&patterns, &payload("CCCC"), PLAIN, 3);
        assert!(matches!(
            outcome,
            RowOutcome::Failed(ref e) if e.pattern_index == Some(0)
        ));
        assert!(!outcome.is_match());
    }
}
