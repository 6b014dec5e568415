//! Long-running folder watch and one-shot folder scan

use crate::config::Settings;
use crate::diagnostics::Diagnostics;
use crate::error::{ConvertError, ConvertResult};
use crate::watch::dispatcher::{is_candidate, ConversionOutcome, Dispatcher, Submission};
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEventKind};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Debounce window for raw filesystem events
const DEBOUNCE: Duration = Duration::from_millis(200);

/// Totals over a service run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunStats {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    fn record(&mut self, outcome: &ConversionOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

fn dispatcher_for(
    settings: &Settings,
    diagnostics: Arc<dyn Diagnostics>,
) -> ConvertResult<(Dispatcher, mpsc::UnboundedReceiver<ConversionOutcome>)> {
    settings.ensure_folders(diagnostics.as_ref())?;
    Ok(Dispatcher::new(
        settings.conversion()?,
        settings.settle_delay,
        settings.max_workers,
        diagnostics,
    ))
}

async fn drain(
    dispatcher: &Dispatcher,
    outcomes: &mut mpsc::UnboundedReceiver<ConversionOutcome>,
    stats: &mut RunStats,
) {
    while stats.total() < dispatcher.accepted() {
        match outcomes.recv().await {
            Some(outcome) => stats.record(&outcome),
            None => break,
        }
    }
}

/// Convert the inputs already present, wait for them, and return
pub async fn run_scan(
    settings: &Settings,
    diagnostics: Arc<dyn Diagnostics>,
) -> ConvertResult<RunStats> {
    let (dispatcher, mut outcomes) = dispatcher_for(settings, diagnostics)?;
    dispatcher.process_existing(&settings.input_folder)?;

    let mut stats = RunStats::default();
    drain(&dispatcher, &mut outcomes, &mut stats).await;
    Ok(stats)
}

/// Watch the input folder until `shutdown` resolves.
///
/// Files present at start-up are converted too. On shutdown no new files
/// are accepted and running conversions are awaited.
pub async fn run_watch<F>(
    settings: &Settings,
    diagnostics: Arc<dyn Diagnostics>,
    shutdown: F,
) -> ConvertResult<RunStats>
where
    F: Future<Output = ()>,
{
    let (dispatcher, mut outcomes) = dispatcher_for(settings, Arc::clone(&diagnostics))?;

    diagnostics.info(&format!(
        "Starting csv2xlsx with CSV folder: {}",
        settings.input_folder.display()
    ));
    diagnostics.info(&format!("Output folder: {}", settings.output_folder.display()));

    let (event_tx, mut events) = mpsc::unbounded_channel::<DebounceEventResult>();
    let mut debouncer = new_debouncer(DEBOUNCE, move |result: DebounceEventResult| {
        let _ = event_tx.send(result);
    })
    .map_err(|e| {
        ConvertError::io_at(&settings.input_folder, format!("Failed to create file watcher: {}", e))
    })?;

    debouncer
        .watcher()
        .watch(&settings.input_folder, RecursiveMode::NonRecursive)
        .map_err(|e| {
            ConvertError::io_at(&settings.input_folder, format!("Failed to watch folder: {}", e))
        })?;

    diagnostics.info(&format!(
        "Watching folder: {} for new CSV files ({} workers)",
        settings.input_folder.display(),
        dispatcher.max_workers()
    ));

    // Scan only once the watch is registered; paths seen by both are deduplicated
    dispatcher.process_existing(&settings.input_folder)?;

    let mut stats = RunStats::default();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Some(outcome) = outcomes.recv() => stats.record(&outcome),
            event = events.recv() => match event {
                Some(Ok(batch)) => {
                    let paths: Vec<PathBuf> = batch
                        .into_iter()
                        .filter(|e| e.kind == DebouncedEventKind::Any)
                        .map(|e| e.path)
                        .filter(|p| is_candidate(p) && p.is_file())
                        .collect();
                    for path in paths {
                        if dispatcher.submit(path.clone()) == Submission::Accepted {
                            diagnostics.info(&format!("New file detected: {}", path.display()));
                        }
                    }
                }
                Some(Err(e)) => diagnostics.error(&format!("Watch error: {}", e)),
                None => {
                    diagnostics.error("File watcher stopped unexpectedly");
                    break;
                }
            },
        }
    }

    diagnostics.info("Stopping csv2xlsx, waiting for running conversions");
    dispatcher.stop_accepting();
    drop(debouncer);
    drain(&dispatcher, &mut outcomes, &mut stats).await;

    Ok(stats)
}

/// Resolves on Ctrl+C, or SIGTERM on unix
pub async fn shutdown_signal(diagnostics: Arc<dyn Diagnostics>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            diagnostics.error(&format!("failed to install Ctrl+C handler: {}", e));
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                diagnostics.error(&format!("failed to install signal handler: {}", e));
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    diagnostics.info("Shutdown signal received");
}
