//! Diagnostics sink handed to every component
//!
//! Components never reach for a global logger. They take a `&dyn Diagnostics`
//! and the binary decides where the messages go (`TracingDiagnostics`), while
//! tests collect them (`MemoryDiagnostics`).

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::Level;
use tracing_subscriber::fmt::writer::{MakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

pub trait Diagnostics: Send + Sync {
    fn emit(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.emit(Level::DEBUG, message);
    }

    fn info(&self, message: &str) {
        self.emit(Level::INFO, message);
    }

    fn warn(&self, message: &str) {
        self.emit(Level::WARN, message);
    }

    fn error(&self, message: &str) {
        self.emit(Level::ERROR, message);
    }
}

/// Forwards every message to the `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn emit(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!("{}", message),
            Level::WARN => tracing::warn!("{}", message),
            Level::INFO => tracing::info!("{}", message),
            Level::DEBUG => tracing::debug!("{}", message),
            Level::TRACE => tracing::trace!("{}", message),
        }
    }
}

/// Keeps messages in memory
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    events: Mutex<Vec<(Level, String)>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(Level, String)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn emit(&self, level: Level, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((level, message.to_string()));
        }
    }
}

pub const LOG_FILE_PREFIX: &str = "csv2xlsx-";
pub const LOG_FILE_EXTENSION: &str = ".log";
/// A log file rolls over once it would grow past this size
pub const LOG_SIZE_LIMIT: u64 = 10 * 1024 * 1024;
/// Log files kept in the directory; older ones are deleted on roll-over
pub const LOG_RETAINED_FILES: usize = 31;

/// Log file writer that rolls daily and on size, keeping the newest files.
///
/// Files are named `csv2xlsx-YYYYMMDD.log`; size roll-overs on the same day
/// continue as `csv2xlsx-YYYYMMDD_001.log`, `_002`, ...
pub struct RollingLog {
    dir: PathBuf,
    size_limit: u64,
    retained: usize,
    state: Mutex<LogState>,
}

#[derive(Default)]
struct LogState {
    date: String,
    sequence: u32,
    written: u64,
    path: Option<PathBuf>,
    file: Option<File>,
}

impl RollingLog {
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        Self::with_limits(dir, LOG_SIZE_LIMIT, LOG_RETAINED_FILES)
    }

    pub fn with_limits(dir: impl Into<PathBuf>, size_limit: u64, retained: usize) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            size_limit: size_limit.max(1),
            retained: retained.max(1),
            state: Mutex::new(LogState::default()),
        })
    }

    /// File currently written to, once anything has been logged
    pub fn current_path(&self) -> Option<PathBuf> {
        self.state.lock().ok().and_then(|state| state.path.clone())
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, LogState>> {
        self.state
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))
    }

    /// Append `buf` to the file for `date` (`YYYYMMDD`)
    fn write_dated(&self, date: &str, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.lock()?;

        if state.file.is_none() || state.date != date {
            state.date = date.to_string();
            state.sequence = 0;
            self.open(&mut state)?;
        } else if state.written > 0 && state.written + buf.len() as u64 > self.size_limit {
            state.sequence += 1;
            self.open(&mut state)?;
        }

        let written = match state.file.as_mut() {
            Some(file) => file.write(buf)?,
            None => return Err(io::Error::other("log file not open")),
        };
        state.written += written as u64;
        Ok(written)
    }

    fn file_name(date: &str, sequence: u32) -> String {
        if sequence == 0 {
            format!("{}{}{}", LOG_FILE_PREFIX, date, LOG_FILE_EXTENSION)
        } else {
            format!("{}{}_{:03}{}", LOG_FILE_PREFIX, date, sequence, LOG_FILE_EXTENSION)
        }
    }

    /// Open the first file of the current day that still has room, then prune
    fn open(&self, state: &mut LogState) -> io::Result<()> {
        loop {
            let path = self.dir.join(Self::file_name(&state.date, state.sequence));
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            let len = file.metadata()?.len();
            if len >= self.size_limit {
                state.sequence += 1;
                continue;
            }
            state.written = len;
            state.path = Some(path);
            state.file = Some(file);
            break;
        }
        self.prune();
        Ok(())
    }

    fn prune(&self) {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return;
        };
        let mut logs: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(LOG_FILE_PREFIX) && n.ends_with(LOG_FILE_EXTENSION))
                    .unwrap_or(false)
            })
            .collect();
        if logs.len() <= self.retained {
            return;
        }
        // Date and sequence sort lexicographically, oldest first
        logs.sort();
        let excess = logs.len() - self.retained;
        for old in logs.into_iter().take(excess) {
            let _ = fs::remove_file(old);
        }
    }
}

/// Writer handed out per event by `RollingLog`
pub struct RollingLogWriter<'a> {
    log: &'a RollingLog,
}


impl Write for RollingLogWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let today = chrono::Local::now().format("%Y%m%d").to_string();
        self.log.write_dated(&today, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.log.lock()?.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for RollingLog {
    type Writer = RollingLogWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        RollingLogWriter { log: self }
    }
}

/// Install the process-wide `tracing` subscriber.
///
/// Logs go to stderr; with `log_dir` set they are also written to a
/// `RollingLog` inside that directory.
pub fn init_tracing(verbose: bool, log_dir: Option<&Path>) -> io::Result<()> {
    let default_filter = if verbose { "csv2xlsx=debug" } else { "csv2xlsx=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let result = match log_dir {
        Some(dir) => builder
            .with_ansi(false)
            .with_writer(io::stderr.and(RollingLog::new(dir)?))
            .try_init(),
        None => builder.with_writer(io::stderr).try_init(),
    };

    // A subscriber installed earlier (tests, embedding) is left in place
    let _ = result;
    Ok(())
}
