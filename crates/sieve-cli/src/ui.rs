use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use molsieve::engine::progress::{Progress, ProgressCallback};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::warn;

const EVENT_CHANNEL_CAPACITY: usize = 1024;
const REDRAW_HZ: u8 = 10;

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

/// The bar of the phase currently running, if any.
struct PhaseDisplay {
    bar: ProgressBar,
    name: &'static str,
}

impl PhaseDisplay {
    fn finish(self) -> &'static str {
        self.bar.finish_and_clear();
        self.name
    }
}

/// Owns the terminal while a command runs and renders [`UiEvent`]s from the
/// screening thread.
pub struct UiManager {
    multi: MultiProgress,
    phase: Option<PhaseDisplay>,
    events: mpsc::Receiver<UiEvent>,
    shutdown: watch::Receiver<bool>,
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (shutdown_sender, shutdown) = watch::channel(false);
        let multi = MultiProgress::with_draw_target(ProgressDrawTarget::stderr_with_hz(REDRAW_HZ));
        let manager = Self {
            multi,
            phase: None,
            events,
            shutdown,
        };
        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.handle_event(event),
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        // Render whatever was queued before shutdown.
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
        if let Some(phase) = self.phase.take() {
            phase.finish();
        }
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(line) => self.print(line),
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn print(&self, line: impl AsRef<str>) {
        self.multi.println(line).ok();
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::PhaseStart { name } => {
                if let Some(previous) = self.phase.take() {
                    previous.finish();
                }
                let bar = self.multi.add(ProgressBar::new_spinner());
                bar.set_style(spinner_style());
                bar.set_message(name);
                bar.enable_steady_tick(Duration::from_millis(100));
                self.phase = Some(PhaseDisplay { bar, name });
            }
            Progress::PhaseFinish => {
                if let Some(phase) = self.phase.take() {
                    let name = phase.finish();
                    self.print(format!("✓ {name}"));
                }
            }
            Progress::TaskStart { total } => {
                let Some(phase) = &self.phase else { return };
                phase.bar.reset();
                if let Some(total) = total {
                    phase.bar.disable_steady_tick();
                    phase.bar.set_length(total);
                    phase.bar.set_style(rows_style());
                }
            }
            Progress::RowFinalized {
                finished, status, ..
            } => {
                let Some(phase) = &self.phase else { return };
                phase.bar.set_position(finished);
                phase.bar.set_message(format!("{} {status}", phase.name));
            }
            Progress::TaskFinish => {
                if let Some(phase) = &self.phase {
                    phase.bar.finish();
                }
            }
            Progress::Message(text) => self.print(format!("  {text}")),
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
        .expect("spinner template is valid")
}

fn rows_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{msg:<48} [{bar:36.green/white}] {human_pos}/{human_len} rows ({per_sec}, {eta})",
    )
    .expect("row bar template is valid")
    .progress_chars("=> ")
}

/// Forwards core progress events into the UI channel without blocking the
/// screening thread.
#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            let per_row = matches!(progress, Progress::RowFinalized { .. });
            match sender.try_send(UiEvent::Progress(progress)) {
                // A later row update supersedes a dropped one.
                Err(mpsc::error::TrySendError::Full(_)) if per_row => {}
                Err(e) => warn!("Progress event not delivered to the UI: {e}"),
                Ok(()) => {}
            }
        })
    }
}
