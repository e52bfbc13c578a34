//! Access to the human-edited Markdown document
//!
//! The remote side offers whole-document reads and writes only: no locking,
//! no transactions, no partial patches.

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::io::write_atomic;

/// Failure talking to the remote document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("unavailable: {0}")]
    Unavailable(String),
}

/// A document that can be read and rewritten as a whole.
///
/// Calls block. An implementation backed by a network client owns the
/// caller's timeout: it configures the client with it and reports an
/// expired call as [`RemoteError::Timeout`]. The engine treats that like any
/// other remote failure and aborts the cycle before touching any store.
pub trait RemoteDocument {
    /// Name used to key sync state
    fn name(&self) -> &str;

    /// Current content; `None` when the document does not exist
    fn fetch(&mut self) -> Result<Option<String>, RemoteError>;

    /// Overwrite the whole document
    fn replace(&mut self, content: &str) -> Result<(), RemoteError>;

    /// Add one line at the end, creating the document if needed
    fn append(&mut self, line: &str) -> Result<(), RemoteError>;
}

/// Append `line` to `content` on a line of its own
fn appended(content: &str, line: &str) -> String {
    let mut next = content.to_string();
    if !next.is_empty() && !next.ends_with('\n') {
        next.push('\n');
    }
    next.push_str(line);
    next.push('\n');
    next
}

/// In-memory document with scripted failures
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    name: String,
    content: Option<String>,
    fetch_failures: VecDeque<RemoteError>,
    replace_failures: VecDeque<RemoteError>,
    writes: usize,
}

impl MemoryDocument {
    /// A document that does not exist yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Make the next fetch fail with `error`
    pub fn fail_next_fetch(&mut self, error: RemoteError) {
        self.fetch_failures.push_back(error);
    }

    /// Make the next replace or append fail with `error`
    pub fn fail_next_write(&mut self, error: RemoteError) {
        self.replace_failures.push_back(error);
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Simulate a human edit
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = Some(content.into());
    }

    /// Number of successful writes
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl RemoteDocument for MemoryDocument {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&mut self) -> Result<Option<String>, RemoteError> {
        match self.fetch_failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(self.content.clone()),
        }
    }

    fn replace(&mut self, content: &str) -> Result<(), RemoteError> {
        if let Some(error) = self.replace_failures.pop_front() {
            return Err(error);
        }
        self.content = Some(content.to_string());
        self.writes += 1;
        Ok(())
    }

    fn append(&mut self, line: &str) -> Result<(), RemoteError> {
        if let Some(error) = self.replace_failures.pop_front() {
            return Err(error);
        }
        let current = self.content.as_deref().unwrap_or_default();
        self.content = Some(appended(current, line));
        self.writes += 1;
        Ok(())
    }
}

/// A Markdown file on the local filesystem
#[derive(Debug, Clone)]
pub struct FileDocument {
    path: PathBuf,
    name: String,
}

impl FileDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn unavailable(path: &Path, error: impl std::fmt::Display) -> RemoteError {
    RemoteError::Unavailable(format!("{}: {error}", path.display()))
}

impl RemoteDocument for FileDocument {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&mut self) -> Result<Option<String>, RemoteError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable(&self.path, e)),
        }
    }

    fn replace(&mut self, content: &str) -> Result<(), RemoteError> {
        write_atomic(&self.path, content.as_bytes()).map_err(|e| unavailable(&self.path, e))
    }

    fn append(&mut self, line: &str) -> Result<(), RemoteError> {
        let current = self.fetch()?.unwrap_or_default();
        let separator = if current.is_empty() || current.ends_with('\n') {
            ""
        } else {
            "\n"
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| unavailable(&self.path, e))?;
        writeln!(file, "{separator}{line}").map_err(|e| unavailable(&self.path, e))
    }
}
