//! Input folder dispatch
//!
//! Watches the input folder, skips inputs whose output already exists and runs
//! every other conversion on a bounded worker pool.

pub mod dispatcher;
pub mod service;

pub use dispatcher::{is_candidate, ConversionOutcome, Dispatcher, Submission};
pub use service::{run_scan, run_watch, shutdown_signal, RunStats};
