//! Input file watching for `--watch`.
//!
//! The watcher follows the input file's parent directory, because editors
//! often save by writing a temporary file and renaming it over the original.
//! Directory-level events are therefore treated as possible changes, and the
//! file content decides: [`FileWatcher::poll`] only reports text that differs
//! from what was last seen. Paths registered with [`FileWatcher::ignoring`],
//! such as our own output file, never start a change.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Watches one Markdown file and yields its content after each settled edit.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    target: PathBuf,
    directory: PathBuf,
    ignored: Vec<PathBuf>,
    debounce: Duration,
    pending_since: Option<Instant>,
    last_content: Option<String>,
}

impl FileWatcher {
    /// Start watching `path`; changes are reported once no event has arrived
    /// for `debounce`.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be created or the directory
    /// cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        let target = normalize(path.as_ref());
        let directory = target
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let (tx, events) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;
        tracing::debug!(path = %target.display(), "watching input file");

        Ok(Self {
            _watcher: watcher,
            events,
            target,
            directory,
            ignored: Vec::new(),
            debounce,
            pending_since: None,
            last_content: None,
        })
    }

    /// Never treat events on `path` as a change. The watched file itself
    /// cannot be ignored.
    #[must_use]
    pub fn ignoring(mut self, path: impl AsRef<Path>) -> Self {
        let path = normalize(path.as_ref());
        if path != self.target {
            self.ignored.push(path);
        }
        self
    }

    /// Content already handled; an edit that restores it is not reported.
    #[must_use]
    pub fn with_baseline(mut self, content: String) -> Self {
        self.last_content = Some(content);
        self
    }

    /// New file content, if an edit has settled and changed the text.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read once the edit settles.
    pub fn poll(&mut self) -> io::Result<Option<String>> {
        if !self.settled() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.target)?;
        if self.last_content.as_deref() == Some(content.as_str()) {
            tracing::trace!("input touched without content change");
            return Ok(None);
        }
        self.last_content = Some(content.clone());
        Ok(Some(content))
    }

    /// Drain pending events and report whether a debounced change is due.
    fn settled(&mut self) -> bool {
        while let Ok(event) = self.events.try_recv() {
            match event {
                Ok(event) if self.concerns_input(&event) => {
                    self.pending_since = Some(Instant::now());
                }
                Ok(event) => tracing::trace!(paths = ?event.paths, "unrelated watch event"),
                Err(err) => tracing::warn!(%err, "file watcher error"),
            }
        }
        match self.pending_since {
            Some(since) if since.elapsed() >= self.debounce => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    fn concerns_input(&self, event: &Event) -> bool {
        event
            .paths
            .iter()
            .filter(|path| !self.ignored.contains(*path))
            .any(|path| {
                path == &self.directory
                    || path == &self.target
                    || path.file_name().is_some_and(|name| Some(name) == self.target.file_name())
            })
    }
}

/// Absolute, symlink-free form of `path`, even when the file does not exist
/// yet (an output file before the first write).
fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map_or_else(|_| absolute.clone(), |parent| parent.join(name)),
        _ => absolute,
    }
}
