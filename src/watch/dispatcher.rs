//! Bounded worker pool for conversions
//!
//! Every accepted input becomes its own tokio task. A semaphore caps how many
//! conversions run at once; the conversion itself runs on a blocking thread.
//! Outcomes are reported over a channel, never dropped.

use crate::core::{convert_file, ConversionReport, ConversionSettings};
use crate::diagnostics::Diagnostics;
use crate::error::{ConvertError, ConvertResult};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

pub const INPUT_EXTENSION: &str = "csv";

/// Finished conversion of one input
#[derive(Debug)]
pub struct ConversionOutcome {
    pub input: PathBuf,
    pub result: ConvertResult<ConversionReport>,
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// What `Dispatcher::submit` did with a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Accepted,
    AlreadyProcessed,
    InFlight,
    NotCandidate,
    Stopped,
}

struct Inner {
    settings: ConversionSettings,
    settle_delay: Duration,
    max_workers: usize,
    permits: Arc<Semaphore>,
    in_flight: Mutex<HashSet<PathBuf>>,
    accepting: AtomicBool,
    accepted: AtomicUsize,
    outcomes: mpsc::UnboundedSender<ConversionOutcome>,
    diagnostics: Arc<dyn Diagnostics>,
}

/// Hands input files to the conversion pipeline
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

/// Does the path look like an input file (`*.csv`, any case)?
pub fn is_candidate(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(INPUT_EXTENSION))
        .unwrap_or(false)
}

impl Dispatcher {
    /// Create a dispatcher and the receiving end of its outcome channel
    pub fn new(
        settings: ConversionSettings,
        settle_delay: Duration,
        max_workers: usize,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> (Self, mpsc::UnboundedReceiver<ConversionOutcome>) {
        let max_workers = max_workers.max(1);
        let (tx, rx) = mpsc::unbounded_channel();
        let inner = Inner {
            settings,
            settle_delay,
            max_workers,
            permits: Arc::new(Semaphore::new(max_workers)),
            in_flight: Mutex::new(HashSet::new()),
            accepting: AtomicBool::new(true),
            accepted: AtomicUsize::new(0),
            outcomes: tx,
            diagnostics,
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }

    pub fn max_workers(&self) -> usize {
        self.inner.max_workers
    }

    /// Conversions submitted but not yet reported
    pub fn pending(&self) -> usize {
        self.inner.in_flight.lock().map(|set| set.len()).unwrap_or(0)
    }

    /// Submissions accepted since creation; each produces exactly one outcome
    pub fn accepted(&self) -> usize {
        self.inner.accepted.load(Ordering::SeqCst)
    }

    /// Refuse further submissions; running conversions finish normally
    pub fn stop_accepting(&self) {
        self.inner.accepting.store(false, Ordering::SeqCst);
    }

    /// Queue `path` for conversion. Must be called from within a tokio runtime.
    pub fn submit(&self, path: PathBuf) -> Submission {
        if !self.inner.accepting.load(Ordering::SeqCst) {
            return Submission::Stopped;
        }
        if !is_candidate(&path) {
            return Submission::NotCandidate;
        }

        let output = self.inner.settings.output_path_for(&path);
        if output.exists() {
            self.inner.diagnostics.info(&format!(
                "Skipping {} - already processed",
                display_name(&path)
            ));
            return Submission::AlreadyProcessed;
        }

        {
            let mut in_flight = match self.inner.in_flight.lock() {
                Ok(set) => set,
                Err(poisoned) => poisoned.into_inner(),
            };
            if !in_flight.insert(path.clone()) {
                return Submission::InFlight;
            }
        }
        self.inner.accepted.fetch_add(1, Ordering::SeqCst);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let _permit = inner.permits.clone().acquire_owned().await.ok();
            tokio::time::sleep(inner.settle_delay).await;

            let task = Arc::clone(&inner);
            let task_path = path.clone();
            let result = tokio::task::spawn_blocking(move || {
                convert_file(&task_path, &task.settings, task.diagnostics.as_ref())
            })
            .await
            .unwrap_or_else(|e| {
                Err(ConvertError::Internal(format!("conversion task failed: {}", e)))
            });

            match &result {
                Ok(_) => inner.diagnostics.info(&format!(
                    "Successfully processed file: {}",
                    display_name(&path)
                )),
                Err(e) => inner.diagnostics.error(&format!(
                    "Error processing file {}: {}",
                    display_name(&path),
                    e
                )),
            }

            if let Ok(mut in_flight) = inner.in_flight.lock() {
                in_flight.remove(&path);
            }
            let _ = inner.outcomes.send(ConversionOutcome {
                input: path,
                result,
            });
        });

        Submission::Accepted
    }

    /// Submit every input already sitting in `folder`, in name order
    pub fn process_existing(&self, folder: &Path) -> ConvertResult<usize> {
        let mut inputs: Vec<PathBuf> = fs::read_dir(folder)
            .map_err(|e| ConvertError::io_at(folder, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_candidate(p))
            .collect();
        inputs.sort();

        if inputs.is_empty() {
            self.inner
                .diagnostics
                .info("No existing CSV files found to process");
            return Ok(0);
        }

        self.inner.diagnostics.info(&format!(
            "Found {} existing CSV files to process",
            inputs.len()
        ));

        let accepted = inputs
            .into_iter()
            .map(|p| self.submit(p))
            .filter(|s| *s == Submission::Accepted)
            .count();
        Ok(accepted)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
