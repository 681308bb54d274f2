use super::cancel::CancellationToken;
use super::compute;
use super::config::ProcessorConfig;
use super::error::ProcessingError;
use super::pattern_set::PatternSet;
use super::progress::{Progress, ProgressReporter};
use super::record::{FinalizedRow, Payload, PendingTask, Row, RowOutcome, RowSink};
use super::reorder::ReorderBuffer;
use super::state::{RunState, RunSummary};
use crate::core::matching::engine::PatternEngine;
use std::any::Any;
use std::collections::VecDeque;
use std::ops::Deref;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

/// What a worker hands back for one record.
enum TaskOutcome<M> {
    Done {
        payload: Payload<M>,
        outcome: RowOutcome,
    },
    /// The run was aborted before the job started.
    Skipped,
    /// The compute step panicked.
    Fault(String),
}

/// State shared between the coordinating thread and the workers.
struct Shared<M> {
    completed: Mutex<ReorderBuffer<TaskOutcome<M>>>,
    ready: Condvar,
    active: AtomicUsize,
    aborted: AtomicBool,
}

impl<M> Shared<M> {
    fn new() -> Self {
        Self {
            completed: Mutex::new(ReorderBuffer::new()),
            ready: Condvar::new(),
            active: AtomicUsize::new(0),
            aborted: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ReorderBuffer<TaskOutcome<M>>> {
        self.completed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn complete(&self, index: u64, outcome: TaskOutcome<M>) {
        self.lock().insert(index, outcome);
        self.ready.notify_all();
    }

    /// Blocks until the completion at the buffer cursor arrives and takes it.
    fn wait_next(&self) -> (u64, TaskOutcome<M>) {
        let mut completed = self.lock();
        loop {
            if let Some(next) = completed.take_next() {
                return next;
            }
            completed = self
                .ready
                .wait(completed)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn try_next(&self) -> Option<(u64, TaskOutcome<M>)> {
        self.lock().take_next()
    }

    fn abort(&self) -> usize {
        self.aborted.store(true, Ordering::SeqCst);
        self.lock().discard()
    }
}

/// Screens a stream of records against a [`PatternSet`] on a bounded worker
/// pool and delivers them to two sinks in submission order.
///
/// Records are evaluated concurrently by up to `max_active_instances` workers,
/// but finalization (writing to a sink) happens on the thread calling
/// [`submit`](Self::submit) and [`finish`](Self::finish), one record at a time and
/// strictly by ascending index. At most `max_queue_size` records are in flight;
/// `submit` blocks by finalizing the oldest record until there is room.
///
/// Records whose outcome is a match go to the matched sink, every other record
/// (unmatched, missing molecule, failed evaluation) to the unmatched sink.
pub struct OrderedRowProcessor<'a, E: PatternEngine, C, A, B> {
    patterns: Arc<PatternSet<E>>,
    config: ProcessorConfig,
    pool: rayon::ThreadPool,
    shared: AbortOnDrop<E::Molecule>,
    pending: VecDeque<PendingTask<C>>,
    matched_sink: A,
    unmatched_sink: B,
    state: RunState,
    submitted: u64,
    matched: u64,
    unmatched: u64,
    cancellation: CancellationToken,
    reporter: ProgressReporter<'a>,
}

impl<'a, E, C, A, B> OrderedRowProcessor<'a, E, C, A, B>
where
    E: PatternEngine,
    A: RowSink<E::Molecule, C>,
    B: RowSink<E::Molecule, C>,
{
    /// Compiles the patterns and starts the worker pool.
    ///
    /// # Errors
    ///
    /// Fails if any pattern does not compile or the pool cannot be built. No
    /// record is accepted in either case.
    pub fn configure<I, S>(
        engine: E,
        patterns: I,
        config: &ProcessorConfig,
        matched_sink: A,
        unmatched_sink: B,
    ) -> Result<Self, ProcessingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = PatternSet::compile(engine, patterns)?;
        Self::with_patterns(Arc::new(patterns), config, matched_sink, unmatched_sink)
    }

    /// Uses an already compiled pattern set, which may be shared between runs.
    ///
    /// # Errors
    ///
    /// Fails with [`ProcessingError::Config`] if either size in `config` is zero.
    pub fn with_patterns(
        patterns: Arc<PatternSet<E>>,
        config: &ProcessorConfig,
        matched_sink: A,
        unmatched_sink: B,
    ) -> Result<Self, ProcessingError> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_active_instances)
            .thread_name(|i| format!("sieve-worker-{i}"))
            .build()?;
        Ok(Self {
            patterns,
            config: config.clone(),
            pool,
            shared: AbortOnDrop(Arc::new(Shared::new())),
            pending: VecDeque::with_capacity(config.max_queue_size),
            matched_sink,
            unmatched_sink,
            state: RunState::Idle,
            submitted: 0,
            matched: 0,
            unmatched: 0,
            cancellation: CancellationToken::new(),
            reporter: ProgressReporter::new(),
        })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_reporter(mut self, reporter: ProgressReporter<'a>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Accepts one record and returns its index.
    ///
    /// Blocks while the in-flight window is full, finalizing records in order
    /// to make room, and finalizes any further records that are already done.
    pub fn submit(&mut self, row: Row<E::Molecule, C>) -> Result<u64, ProcessingError> {
        if !self.state.accepts_records() {
            return Err(ProcessingError::NotAccepting { state: self.state });
        }
        self.start();
        let result = self.admit(row);
        self.settle(result)
    }

    /// Finalizes every outstanding record and closes the run.
    pub fn finish(&mut self) -> Result<RunSummary, ProcessingError> {
        if !self.state.accepts_records() {
            return Err(ProcessingError::NotAccepting { state: self.state });
        }
        self.start();
        self.state = RunState::Draining;
        let result = self.drain();
        self.settle(result)?;

        self.state = RunState::Finalized;
        let summary = self.summary();
        self.reporter.report(Progress::TaskFinish);
        info!(
            submitted = summary.submitted,
            matched = summary.matched,
            unmatched = summary.unmatched,
            "Run finalized"
        );
        Ok(summary)
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn submitted_count(&self) -> u64 {
        self.submitted
    }

    pub fn finalized_count(&self) -> u64 {
        self.matched + self.unmatched
    }

    pub fn matched_count(&self) -> u64 {
        self.matched
    }

    pub fn unmatched_count(&self) -> u64 {
        self.unmatched
    }

    /// Records submitted but not yet finalized.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Workers currently evaluating a record.
    pub fn active_count(&self) -> usize {
        self.shared.active.load(Ordering::SeqCst)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            submitted: self.submitted,
            matched: self.matched,
            unmatched: self.unmatched,
        }
    }

    /// Returns the matched and unmatched sinks.
    pub fn into_sinks(self) -> (A, B) {
        let Self {
            matched_sink,
            unmatched_sink,
            ..
        } = self;
        (matched_sink, unmatched_sink)
    }

    fn start(&mut self) {
        if self.state != RunState::Idle {
            return;
        }
        self.state = RunState::Running;
        info!(
            patterns = self.patterns.len(),
            max_queue_size = self.config.max_queue_size,
            max_active_instances = self.config.max_active_instances,
            "Starting ordered run"
        );
        self.reporter.report(Progress::TaskStart {
            total: self.config.expected_total,
        });
    }

    fn admit(&mut self, row: Row<E::Molecule, C>) -> Result<u64, ProcessingError> {
        self.check_cancelled()?;
        while self.pending.len() >= self.config.max_queue_size {
            self.finalize_next()?;
        }
        self.finalize_ready()?;

        let index = self.submitted;
        self.submitted += 1;
        self.pending.push_back(PendingTask {
            index,
            key: row.key,
            passthrough: row.passthrough,
        });
        self.dispatch(index, row.payload);
        Ok(index)
    }

    fn dispatch(&self, index: u64, payload: Payload<E::Molecule>) {
        let patterns = Arc::clone(&self.patterns);
        let shared = Arc::clone(&self.shared.0);
        let mode = self.config.output;
        self.pool.spawn(move || {
            if shared.aborted.load(Ordering::SeqCst) {
                shared.complete(index, TaskOutcome::Skipped);
                return;
            }
            shared.active.fetch_add(1, Ordering::SeqCst);
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                compute::evaluate(&patterns, &payload, mode, index)
            }));
            shared.active.fetch_sub(1, Ordering::SeqCst);
            let outcome = match result {
                Ok(outcome) => TaskOutcome::Done { payload, outcome },
                Err(panic) => TaskOutcome::Fault(panic_message(panic.as_ref())),
            };
            shared.complete(index, outcome);
        });
    }

    fn drain(&mut self) -> Result<(), ProcessingError> {
        self.check_cancelled()?;
        while !self.pending.is_empty() {
            self.finalize_next()?;
        }
        Ok(())
    }

    /// Finalizes the oldest pending record, waiting for it if necessary.
    fn finalize_next(&mut self) -> Result<(), ProcessingError> {
        self.check_cancelled()?;
        if self.pending.is_empty() {
            return Ok(());
        }
        let (index, outcome) = self.shared.wait_next();
        self.deliver(index, outcome)?;
        self.check_cancelled()
    }

    /// Finalizes pending records for as long as the next one is already done.
    fn finalize_ready(&mut self) -> Result<(), ProcessingError> {
        while !self.pending.is_empty() {
            let Some((index, outcome)) = self.shared.try_next() else {
                break;
            };
            self.deliver(index, outcome)?;
            self.check_cancelled()?;
        }
        Ok(())
    }

    fn deliver(
        &mut self,
        index: u64,
        outcome: TaskOutcome<E::Molecule>,
    ) -> Result<(), ProcessingError> {
        let task = match self.pending.pop_front() {
            Some(task) if task.index == index => task,
            _ => {
                return Err(ProcessingError::WorkerFault {
                    index,
                    message: "completion does not belong to the oldest pending record".to_string(),
                });
            }
        };

        let (payload, outcome) = match outcome {
            TaskOutcome::Done { payload, outcome } => (payload, outcome),
            TaskOutcome::Skipped => {
                return Err(ProcessingError::Cancelled {
                    finalized: self.finalized_count(),
                });
            }
            TaskOutcome::Fault(message) => {
                error!(index, key = %task.key, %message, "Worker fault");
                return Err(ProcessingError::WorkerFault { index, message });
            }
        };

        let is_match = outcome.is_match();
        let row = FinalizedRow {
            index,
            key: task.key,
            payload,
            outcome,
            passthrough: task.passthrough,
        };
        if is_match {
            self.matched_sink.push_row(row)?;
            self.matched += 1;
        } else {
            self.unmatched_sink.push_row(row)?;
            self.unmatched += 1;
        }

        let finished = self.finalized_count();
        debug!(index, matched = is_match, "Finalized record");
        self.reporter.report(Progress::RowFinalized {
            finished,
            fraction: self
                .config
                .expected_total
                .filter(|&total| total > 0)
                .map(|total| finished as f64 / total as f64),
            status: format!(
                "{finished} (active/submitted: {}/{})",
                self.active_count(),
                self.pending.len()
            ),
        });
        Ok(())
    }

    fn check_cancelled(&self) -> Result<(), ProcessingError> {
        if self.cancellation.is_cancelled() {
            return Err(ProcessingError::Cancelled {
                finalized: self.finalized_count(),
            });
        }
        Ok(())
    }

    /// Moves the run into its terminal error state when `result` failed.
    fn settle<T>(&mut self, result: Result<T, ProcessingError>) -> Result<T, ProcessingError> {
        if let Err(e) = &result {
            self.state = match e {
                ProcessingError::Cancelled { .. } => RunState::Cancelled,
                _ => RunState::Failed,
            };
            let discarded = self.shared.abort();
            self.pending.clear();
            info!(state = %self.state, discarded, error = %e, "Run stopped");
        }
        result
    }
}

/// Flags the shared state aborted once the processor is gone, so queued jobs
/// skip their computation.
struct AbortOnDrop<M>(Arc<Shared<M>>);

impl<M> Deref for AbortOnDrop<M> {
    type Target = Arc<Shared<M>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<M> Drop for AbortOnDrop<M> {
    fn drop(&mut self) {
        self.0.aborted.store(true, Ordering::SeqCst);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matching::engine::{Mapping, MappingSet};
    use crate::engine::config::{ConfigError, ProcessorConfigBuilder};
    use std::thread;
    use std::time::Duration;
    use thiserror::Error;

    const PANICS: i64 = 666;

    #[derive(Debug, Error)]
    #[error("{0}")]
    struct ModuloError(String);

    /// Pattern `d` matches molecule `m` when `d` divides `m`. Negative molecules
    /// fail evaluation and [`PANICS`] panics. Evaluation sleeps a little so
    /// completions arrive out of order.
    struct ModuloEngine;

    impl PatternEngine for ModuloEngine {
        type Molecule = i64;
        type Query = i64;
        type Prepared = ();
        type Error = ModuloError;

        fn compile(&self, source: &str) -> Result<i64, ModuloError> {
            source
                .parse::<i64>()
                .ok()
                .filter(|&d| d > 0)
                .ok_or_else(|| ModuloError(format!("not a divisor: {source}")))
        }

        fn prepare(&self, molecule: &i64) -> Result<(), ModuloError> {
            if *molecule == PANICS {
                panic!("evaluation exploded");
            }
            if *molecule < 0 {
                return Err(ModuloError("negative molecule".to_string()));
            }
            thread::sleep(Duration::from_micros((molecule * 7919 % 13) as u64 * 50));
            Ok(())
        }

        fn has_mapping(&self, query: &i64, molecule: &i64, _: &()) -> Result<bool, ModuloError> {
            Ok(molecule % query == 0)
        }

        fn mappings(&self, query: &i64, molecule: &i64, _: &()) -> Result<MappingSet, ModuloError> {
            let hit = molecule % query == 0;
            Ok(MappingSet::new(
                hit.then(|| Mapping {
                    atoms: vec![*molecule as usize],
                    bonds: vec![],
                })
                .into_iter()
                .collect(),
            ))
        }
    }

    type Rows = Vec<FinalizedRow<i64, usize>>;
    type Processor<'a> = OrderedRowProcessor<'a, ModuloEngine, usize, Rows, Rows>;

    fn config(queue: usize, active: usize) -> ProcessorConfig {
        ProcessorConfigBuilder::new()
            .max_queue_size(queue)
            .max_active_instances(active)
            .build()
            .unwrap()
    }

    fn processor<'a>(patterns: &[&str], config: &ProcessorConfig) -> Processor<'a> {
        OrderedRowProcessor::configure(ModuloEngine, patterns, config, Vec::new(), Vec::new())
            .unwrap()
    }

    fn row(index: usize, value: Option<i64>) -> Row<i64, usize> {
        let payload = value.map_or(Payload::Missing, Payload::Molecule);
        Row::new(format!("r{index}"), payload, index)
    }

    fn run(values: &[Option<i64>], config: &ProcessorConfig) -> (Rows, Rows, RunSummary) {
        let mut processor = processor(&["3"], config);
        for (i, value) in values.iter().enumerate() {
            assert_eq!(processor.submit(row(i, *value)).unwrap(), i as u64);
        }
        let summary = processor.finish().unwrap();
        let (matched, unmatched) = processor.into_sinks();
        (matched, unmatched, summary)
    }

    fn indices(rows: &Rows) -> Vec<u64> {
        rows.iter().map(|row| row.index).collect()
    }

    #[test]
    fn partition_reconstructs_every_index_in_ascending_order() {
        let values: Vec<_> = (0..200).map(Some).collect();
        let (matched, unmatched, summary) = run(&values, &config(8, 4));

        let a = indices(&matched);
        let b = indices(&unmatched);
        assert!(a.windows(2).all(|w| w[0] < w[1]));
        assert!(b.windows(2).all(|w| w[0] < w[1]));

        let mut all: Vec<u64> = a.iter().chain(&b).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..200).collect::<Vec<_>>());

        assert!(matched.iter().all(|row| row.payload.molecule().unwrap() % 3 == 0));
        assert!(matched.iter().chain(&unmatched).all(|row| row.passthrough as u64 == row.index));
        assert_eq!(summary.matched, 67);
        assert_eq!(summary.unmatched, 133);
        assert_eq!(summary.submitted, 200);
    }

    #[test]
    fn output_is_identical_across_pool_sizes() {
        let values: Vec<_> = (0..120)
            .map(|v| if v % 11 == 0 { None } else { Some(v) })
            .collect();
        let keys = |rows: &Rows| rows.iter().map(|row| row.key.clone()).collect::<Vec<_>>();

        let (a1, b1, _) = run(&values, &config(10, 1));
        for active in [2, 8] {
            let (a, b, _) = run(&values, &config(10 * active, active));
            assert_eq!(keys(&a), keys(&a1), "matched differs with {active} workers");
            assert_eq!(keys(&b), keys(&b1), "unmatched differs with {active} workers");
        }
    }

    #[test]
    fn queue_of_one_finalizes_before_accepting_more() {
        let config = config(1, 4);
        let mut processor = processor(&["2"], &config);
        for i in 0..30 {
            let index = processor.submit(row(i, Some(i as i64))).unwrap();
            assert_eq!(processor.finalized_count(), index);
            assert!(processor.pending_count() <= 1);
        }
        processor.finish().unwrap();
        assert_eq!(processor.finalized_count(), 30);
    }

    #[test]
    fn in_flight_records_never_exceed_queue_size() {
        let config = config(3, 2);
        let mut processor = processor(&["2"], &config);
        for i in 0..50 {
            processor.submit(row(i, Some(i as i64))).unwrap();
            assert!(processor.submitted_count() - processor.finalized_count() <= 3);
        }
        let summary = processor.finish().unwrap();
        assert_eq!(summary.finalized(), 50);
        assert_eq!(processor.pending_count(), 0);
    }

    #[test]
    fn missing_and_failed_records_go_to_unmatched() {
        let values = [Some(3), None, Some(-3), Some(4)];
        let (matched, unmatched, summary) = run(&values, &config(4, 2));
        assert_eq!(indices(&matched), vec![0]);
        assert_eq!(indices(&unmatched), vec![1, 2, 3]);
        assert_eq!(unmatched[0].outcome, RowOutcome::Missing);
        assert!(matches!(unmatched[1].outcome, RowOutcome::Failed(_)));
        assert_eq!(unmatched[1].payload, Payload::Molecule(-3));
        assert_eq!(summary.finalized(), 4);
    }

    #[test]
    fn cancellation_leaves_exactly_the_finalized_prefix() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |event: Progress| {
            if let Progress::RowFinalized { finished: 5, .. } = event {
                trigger.cancel();
            }
        }));
        let mut processor = processor(&["2"], &config(2, 2))
            .with_cancellation(token)
            .with_reporter(reporter);

        let mut failure = None;
        for i in 0..40 {
            if let Err(e) = processor.submit(row(i, Some(i as i64))) {
                failure = Some(e);
                break;
            }
        }
        let failure = failure.or_else(|| processor.finish().err());

        assert!(matches!(failure, Some(ProcessingError::Cancelled { finalized: 5 })));
        assert_eq!(processor.state(), RunState::Cancelled);
        assert!(matches!(
            processor.submit(row(99, Some(1))),
            Err(ProcessingError::NotAccepting {
                state: RunState::Cancelled
            })
        ));
        let (matched, unmatched) = processor.into_sinks();
        let mut all: Vec<u64> = indices(&matched).into_iter().chain(indices(&unmatched)).collect();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn worker_panic_fails_the_run() {
        let values = [Some(1), Some(2), Some(PANICS), Some(4), Some(5)];
        let mut processor = processor(&["1"], &config(10, 2));
        let mut failure = None;
        for (i, value) in values.iter().enumerate() {
            if let Err(e) = processor.submit(row(i, *value)) {
                failure = Some(e);
                break;
            }
        }
        let failure = failure.or_else(|| processor.finish().err());

        match failure {
            Some(ProcessingError::WorkerFault { index, message }) => {
                assert_eq!(index, 2);
                assert!(message.contains("exploded"));
            }
            other => panic!("expected worker fault, got {other:?}"),
        }
        assert_eq!(processor.state(), RunState::Failed);
        assert_eq!(processor.finalized_count(), 2);
    }

    #[test]
    fn invalid_pattern_fails_configuration() {
        let result: Result<Processor, _> = OrderedRowProcessor::configure(
            ModuloEngine,
            ["2", "zero"],
            &config(1, 1),
            Vec::new(),
            Vec::new(),
        );
        match result {
            Err(ProcessingError::InvalidPattern(e)) => {
                assert_eq!(e.index, 1);
                assert_eq!(e.pattern, "zero");
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("configuration should fail"),
        }
    }

    #[test]
    fn hand_built_config_with_zero_sizes_is_rejected() {
        let valid = config(4, 2);
        for (field, broken) in [
            (
                "max_queue_size",
                ProcessorConfig {
                    max_queue_size: 0,
                    ..valid.clone()
                },
            ),
            (
                "max_active_instances",
                ProcessorConfig {
                    max_active_instances: 0,
                    ..valid.clone()
                },
            ),
        ] {
            let result: Result<Processor, _> = OrderedRowProcessor::configure(
                ModuloEngine,
                ["2"],
                &broken,
                Vec::new(),
                Vec::new(),
            );
            match result {
                Err(ProcessingError::Config(ConfigError::InvalidValue { name, .. })) => {
                    assert_eq!(name, field)
                }
                Err(other) => panic!("unexpected error {other}"),
                Ok(_) => panic!("{field} = 0 should be rejected"),
            }
        }
    }

    #[test]
    fn finishing_closes_the_run() {
        let mut processor = processor(&["2"], &config(1, 1));
        assert_eq!(processor.state(), RunState::Idle);
        assert_eq!(processor.finish().unwrap(), RunSummary::default());
        assert_eq!(processor.state(), RunState::Finalized);
        assert!(matches!(
            processor.submit(row(0, Some(2))),
            Err(ProcessingError::NotAccepting {
                state: RunState::Finalized
            })
        ));
        assert!(processor.finish().is_err());
    }

    #[test]
    fn progress_reports_fraction_and_status() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let reporter = ProgressReporter::with_callback(Box::new(move |event: Progress| {
            sink.lock().unwrap().push(event);
        }));
        let config = ProcessorConfigBuilder::new()
            .max_queue_size(2)
            .max_active_instances(2)
            .expected_total(4)
            .build()
            .unwrap();
        let mut processor = processor(&["2"], &config).with_reporter(reporter);
        for i in 0..4 {
            processor.submit(row(i, Some(i as i64))).unwrap();
        }
        processor.finish().unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.first(), Some(&Progress::TaskStart { total: Some(4) }));
        assert_eq!(events.last(), Some(&Progress::TaskFinish));
        let finalized: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                Progress::RowFinalized {
                    finished,
                    fraction,
                    status,
                } => Some((*finished, *fraction, status.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(finalized.len(), 4);
        let (finished, fraction, status) = &finalized[3];
        assert_eq!(*finished, 4);
        assert_eq!(*fraction, Some(1.0));
        assert!(status.starts_with("4 (active/submitted: "));
    }

    #[test]
    fn counts_mode_attaches_counts_to_matched_rows() {
        let config = ProcessorConfigBuilder::new()
            .max_queue_size(4)
            .max_active_instances(2)
            .counts(true)
            .build()
            .unwrap();
        let mut processor = processor(&["2", "3"], &config);
        for (i, value) in [6, 4, 5].into_iter().enumerate() {
            processor.submit(row(i, Some(value))).unwrap();
        }
        processor.finish().unwrap();
        let (matched, unmatched) = processor.into_sinks();
        let counts: Vec<_> = matched
            .iter()
            .map(|row| row.outcome.result().unwrap().counts.clone().unwrap())
            .collect();
        assert_eq!(counts, vec![vec![1, 1], vec![1, 0]]);
        assert_eq!(unmatched[0].outcome.result().unwrap().counts, None);
    }
}
