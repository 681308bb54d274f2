use crate::cli::ScreenArgs;
use crate::config::{DefaultsConfig, PartialScreenConfig, ScreenSettings};
use crate::error::{CliError, Result};
use crate::table::{self, CsvRowSource, CsvSink};
use crate::ui::{CliProgressHandler, UiEvent};
use molsieve::core::matching::substructure::SubstructureEngine;
use molsieve::engine::cancel::CancellationToken;
use molsieve::engine::progress::ProgressReporter;
use molsieve::engine::state::RunSummary;
use molsieve::workflows;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn run(
    args: ScreenArgs,
    threads: Option<usize>,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialScreenConfig::from_file(path)?,
        None => PartialScreenConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let settings = partial_config.merge_with_cli(&args, &DefaultsConfig::detect(threads))?;

    let cancellation = CancellationToken::new();
    let interrupt = tokio::spawn({
        let cancellation = cancellation.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling the run.");
                cancellation.cancel();
            }
        }
    });

    let handler = CliProgressHandler::new(ui_sender.clone());
    let reporter = ProgressReporter::with_callback(handler.get_callback());
    let result = tokio::task::block_in_place(|| screen(&settings, cancellation, &reporter));
    interrupt.abort();
    let summary = result?;

    ui_sender
        .send(UiEvent::Log(format!(
            "Screened {} rows: {} matched, {} unmatched.",
            summary.submitted, summary.matched, summary.unmatched
        )))
        .await
        .ok();

    if let Some(path) = &settings.summary {
        write_summary(path, &summary)?;
        info!("Run summary written to {:?}", path);
    }
    Ok(())
}

fn screen(
    settings: &ScreenSettings,
    cancellation: CancellationToken,
    reporter: &ProgressReporter,
) -> Result<RunSummary> {
    info!("Counting rows of {:?}", &settings.input);
    let total = table::count_rows(&settings.input)?;
    let source = CsvRowSource::open(
        &settings.input,
        &settings.column,
        settings.key_column.as_deref(),
    )?;

    let mode = settings.processor.output;
    let mut matched = CsvSink::create(&settings.matched, source.headers(), source.column(), mode)?;
    let mut unmatched =
        CsvSink::create(&settings.unmatched, source.headers(), source.column(), mode)?;

    let mut config = settings.processor.clone();
    config.expected_total = Some(total);

    info!(
        "Screening {} rows against {} pattern(s)...",
        total,
        settings.patterns.len()
    );
    let result = workflows::screen::run(
        engine(settings),
        &settings.patterns,
        source.into_rows(),
        &config,
        &mut matched,
        &mut unmatched,
        cancellation,
        reporter,
    );

    // Whatever was finalized before a failure is kept.
    matched.flush()?;
    unmatched.flush()?;
    result.map_err(CliError::from)
}

fn engine(settings: &ScreenSettings) -> SubstructureEngine {
    let engine = SubstructureEngine::new();
    match settings.search_limit {
        Some(limit) => engine.with_search_limit(limit),
        None => engine,
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let content = toml::to_string(summary).map_err(|e| CliError::Other(e.into()))?;
    std::fs::write(path, content)?;
    Ok(())
}
