use crate::core::matching::engine::PatternEngine;
use crate::engine::cancel::CancellationToken;
use crate::engine::config::ProcessorConfig;
use crate::engine::error::ProcessingError;
use crate::engine::processor::OrderedRowProcessor;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::record::{Row, RowSink};
use crate::engine::state::RunSummary;
use std::error::Error as StdError;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum ScreenError<X: StdError + 'static> {
    #[error(transparent)]
    Processing(#[from] ProcessingError),
    #[error("Failed to read record {index}: {source}")]
    Source { index: u64, source: X },
}

/// Screens every record of `rows` against `patterns`.
///
/// Matched records are written to `matched`, all others to `unmatched`, each in
/// input order. Pass sinks by `&mut` to keep them after the run. The first row
/// source error stops the run.
#[allow(clippy::too_many_arguments)]
#[instrument(skip_all, name = "screen_workflow")]
pub fn run<E, C, X, I, S, A, B>(
    engine: E,
    patterns: &[S],
    rows: I,
    config: &ProcessorConfig,
    matched: A,
    unmatched: B,
    cancellation: CancellationToken,
    reporter: &ProgressReporter,
) -> Result<RunSummary, ScreenError<X>>
where
    E: PatternEngine,
    X: StdError + 'static,
    I: IntoIterator<Item = Result<Row<E::Molecule, C>, X>>,
    S: AsRef<str>,
    A: RowSink<E::Molecule, C>,
    B: RowSink<E::Molecule, C>,
{
    reporter.report(Progress::PhaseStart {
        name: "Compiling patterns",
    });
    let processor = OrderedRowProcessor::configure(engine, patterns, config, matched, unmatched)?;
    info!(patterns = patterns.len(), "Compiled pattern set");
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart { name: "Screening" });
    let forward = ProgressReporter::with_callback(Box::new(|event: Progress| reporter.report(event)));
    let mut processor = processor
        .with_cancellation(cancellation)
        .with_reporter(forward);

    for (index, row) in rows.into_iter().enumerate() {
        let row = row.map_err(|source| ScreenError::Source {
            index: index as u64,
            source,
        })?;
        processor.submit(row)?;
    }
    let summary = processor.finish()?;
    reporter.report(Progress::PhaseFinish);

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matching::substructure::SubstructureEngine;
    use crate::core::models::molecule::Molecule;
    use crate::engine::config::ProcessorConfigBuilder;
    use crate::engine::record::{FinalizedRow, Payload, RowOutcome};
    use std::convert::Infallible;
    use std::io;

    type Rows = Vec<FinalizedRow<Molecule, ()>>;

    fn molecule_row(key: &str, smiles: Option<&str>) -> Result<Row<Molecule, ()>, Infallible> {
        let payload = match smiles {
            Some(text) => Payload::Molecule(Molecule::from_smiles(text).unwrap()),
            None => Payload::Missing,
        };
        Ok(Row::new(key, payload, ()))
    }

    fn config(counts: bool) -> ProcessorConfig {
        ProcessorConfigBuilder::new()
            .max_queue_size(8)
            .max_active_instances(2)
            .counts(counts)
            .build()
            .unwrap()
    }

    fn keys(rows: &Rows) -> Vec<&str> {
        rows.iter().map(|row| row.key.as_str()).collect()
    }

    #[test]
    fn rows_are_split_between_matched_and_unmatched() {
        let rows = vec![
            molecule_row("R0", Some("CCO")),
            molecule_row("R1", None),
            molecule_row("R2", Some("CC")),
        ];
        let (mut matched, mut unmatched): (Rows, Rows) = (Vec::new(), Vec::new());
        let summary = run(
            SubstructureEngine::new(),
            &["O"],
            rows,
            &config(false),
            &mut matched,
            &mut unmatched,
            CancellationToken::new(),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(keys(&matched), vec!["R0"]);
        assert_eq!(keys(&unmatched), vec!["R1", "R2"]);
        assert_eq!(unmatched[0].outcome, RowOutcome::Missing);
        assert_eq!(summary.submitted, 3);
        assert_eq!(summary.matched, 1);
    }

    #[test]
    fn identical_patterns_each_report_their_count() {
        let (mut matched, mut unmatched): (Rows, Rows) = (Vec::new(), Vec::new());
        run(
            SubstructureEngine::new(),
            &["O", "O"],
            vec![molecule_row("water", Some("O"))],
            &config(true),
            &mut matched,
            &mut unmatched,
            CancellationToken::new(),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(unmatched.is_empty());
        let result = matched[0].outcome.result().unwrap();
        assert_eq!(result.counts, Some(vec![1, 1]));
    }

    #[test]
    fn evaluation_failure_is_recorded_and_run_succeeds() {
        let (mut matched, mut unmatched): (Rows, Rows) = (Vec::new(), Vec::new());
        let summary = run(
            SubstructureEngine::new().with_search_limit(4),
            &["CCCC"],
            vec![
                molecule_row("long", Some("CCCCCCCCCC")),
                molecule_row("short", Some("C")),
            ],
            &config(false),
            &mut matched,
            &mut unmatched,
            CancellationToken::new(),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(matched.is_empty());
        assert_eq!(keys(&unmatched), vec!["long", "short"]);
        assert!(matches!(unmatched[0].outcome, RowOutcome::Failed(_)));
        assert_eq!(summary.unmatched, 2);
    }

    #[test]
    fn source_errors_stop_the_run() {
        let rows = vec![
            Ok(Row::new("ok", Payload::Missing, ())),
            Err(io::Error::other("truncated input")),
        ];
        let err = run(
            SubstructureEngine::new(),
            &["O"],
            rows,
            &config(false),
            Rows::new(),
            Rows::new(),
            CancellationToken::new(),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ScreenError::Source { index: 1, .. }));
    }

    #[test]
    fn invalid_pattern_is_reported_before_any_row_is_read() {
        let err = run(
            SubstructureEngine::new(),
            &["C", "[CH4]"],
            Vec::<Result<Row<Molecule, ()>, Infallible>>::new(),
            &config(false),
            Rows::new(),
            Rows::new(),
            CancellationToken::new(),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        match err {
            ScreenError::Processing(ProcessingError::InvalidPattern(e)) => assert_eq!(e.index, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn cancelled_runs_surface_the_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let err = run(
            SubstructureEngine::new(),
            &["O"],
            vec![molecule_row("R0", Some("O"))],
            &config(false),
            Rows::new(),
            Rows::new(),
            token,
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScreenError::Processing(ProcessingError::Cancelled { finalized: 0 })
        ));
    }
}
