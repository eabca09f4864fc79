//! Rolling Logger
//!
//! Installs a `tracing` subscriber that writes to a log file rolled over once
//! per day, and keeps the most recent lines in a bounded in-memory buffer so a
//! running service can hand them out for diagnostics.
//!
//! Records emitted through the `log` facade are bridged into the subscriber,
//! so library crates only need `log::info!` and friends.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::MakeWriter;

/// Number of daily files kept on disk
pub const MAX_LOG_FILES: usize = 7;

/// Number of lines kept in the in-memory buffer
pub const BUFFER_CAPACITY: usize = 500;

static LOGGER: OnceLock<RollingFile> = OnceLock::new();

struct RollingState {
    dir: PathBuf,
    prefix: String,
    current_date: String,
    file: Option<File>,
    buffer: VecDeque<String>,
    capacity: usize,
    max_files: usize,
}

impl RollingState {
    fn file_name(&self, date: &str) -> String {
        format!("{}.{}.log", self.prefix, date)
    }

    fn append(&mut self, buf: &[u8]) -> io::Result<()> {
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        if self.file.is_none() || today != self.current_date {
            let path = self.dir.join(self.file_name(&today));
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            self.file = Some(file);
            self.current_date = today;
            self.prune()?;
        }

        if let Some(file) = self.file.as_mut() {
            file.write_all(buf)?;
        }

        for line in String::from_utf8_lossy(buf).lines() {
            if line.is_empty() {
                continue;
            }
            self.buffer.push_back(line.to_string());
        }
        while self.buffer.len() > self.capacity {
            self.buffer.pop_front();
        }
        Ok(())
    }

    /// Remove the oldest files beyond `max_files`
    fn prune(&self) -> io::Result<()> {
        let marker = format!("{}.", self.prefix);
        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with(&marker) && name.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        if files.len() <= self.max_files {
            return Ok(());
        }

        // Date-stamped names sort chronologically
        files.sort();
        let excess = files.len() - self.max_files;
        for path in files.into_iter().take(excess) {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Daily-rolled log file plus a ring buffer of recent lines.
///
/// Cheap to clone; all clones share the same file handle and buffer.
#[derive(Clone)]
pub struct RollingFile {
    state: Arc<Mutex<RollingState>>,
}

impl RollingFile {
    pub fn new(dir: impl AsRef<Path>, prefix: &str) -> io::Result<Self> {
        Self::with_limits(dir, prefix, BUFFER_CAPACITY, MAX_LOG_FILES)
    }

    pub fn with_limits(
        dir: impl AsRef<Path>,
        prefix: &str,
        capacity: usize,
        max_files: usize,
    ) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            state: Arc::new(Mutex::new(RollingState {
                dir,
                prefix: prefix.to_string(),
                current_date: String::new(),
                file: None,
                buffer: VecDeque::with_capacity(capacity),
                capacity,
                max_files: max_files.max(1),
            })),
        })
    }

    /// Snapshot of the buffered lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        match self.state.lock() {
            Ok(state) => state.buffer.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().buffer.iter().cloned().collect(),
        }
    }

    /// Path of the file currently written to, if any line was written yet
    pub fn current_path(&self) -> Option<PathBuf> {
        let state = self.state.lock().ok()?;
        if state.file.is_none() {
            return None;
        }
        Some(state.dir.join(state.file_name(&state.current_date)))
    }
}

/// Writer handed out to the fmt layer for each event
pub struct RollingWriter {
    state: Arc<Mutex<RollingState>>,
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        state.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        match state.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for RollingFile {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RollingWriter {
            state: Arc::clone(&self.state),
        }
    }
}

/// Initialize the global logger writing into `log_dir`.
///
/// Calling it again after a successful initialization is a no-op.
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<(), String> {
    if LOGGER.get().is_some() {
        return Ok(());
    }

    let file = RollingFile::new(&log_dir, app_name)
        .map_err(|e| format!("Failed to create log dir: {}", e))?;

    tracing_subscriber::fmt()
        .with_writer(file.clone())
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| format!("Failed to install subscriber: {}", e))?;

    let _ = LOGGER.set(file);
    log::info!("Logging to {} with prefix \"{}\"", log_dir.as_ref().display(), app_name);
    Ok(())
}

fn ensure_initialized() -> Result<(), String> {
    if LOGGER.get().is_none() {
        return Err("Logger not initialized".to_string());
    }
    Ok(())
}

pub fn info(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::info!("{}", msg);
    Ok(())
}

pub fn warn(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::warn!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::error!("{}", msg);
    Ok(())
}

/// Lines buffered by the global logger; empty before `init_logger`
pub fn recent_logs() -> Vec<String> {
    LOGGER.get().map(RollingFile::lines).unwrap_or_default()
}
