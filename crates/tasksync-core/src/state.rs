//! Persisted per-document sync state
//!
//! A [`SyncState`] holds the identity table (normalized key to task id) and
//! the header associations (grouping key to header line) for one document.
//! It is loaded once at the start of a cycle and saved once at the end of a
//! successful one.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::io::write_atomic;
use crate::{Error, Result};

const STATE_VERSION: &str = "1";
const STATE_SUFFIX: &str = ".sync.toml";

/// The header line that renders one grouping key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderAssociation {
    /// Header exactly as written, e.g. `## Work Items`
    pub line: String,
    /// Tag literal restored onto tasks pulled from this section
    pub tag: String,
}

/// Identity table and header associations for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    version: String,
    #[serde(default)]
    pub identities: BTreeMap<String, String>,
    #[serde(default)]
    pub headers: BTreeMap<String, HeaderAssociation>,
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncState {
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION.to_string(),
            identities: BTreeMap::new(),
            headers: BTreeMap::new(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty() && self.headers.is_empty()
    }

    /// Id tracked for `key`
    pub fn identity(&self, key: &str) -> Option<&str> {
        self.identities.get(key).map(String::as_str)
    }
}

/// Load and save [`SyncState`] per document
pub trait SyncStateStore {
    /// Load the state for `document`; a document never synced before has an
    /// empty state
    fn load(&self, document: &str) -> Result<SyncState>;

    /// Replace the stored state for `document`
    fn save(&mut self, document: &str, state: &SyncState) -> Result<()>;
}

/// Keeps states in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    states: HashMap<String, SyncState>,
    saves: usize,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a state as if saved by an earlier cycle
    pub fn with_state(mut self, document: &str, state: SyncState) -> Self {
        self.states.insert(document.to_string(), state);
        self
    }

    pub fn get(&self, document: &str) -> Option<&SyncState> {
        self.states.get(document)
    }

    /// Number of successful saves
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl SyncStateStore for MemoryStateStore {
    fn load(&self, document: &str) -> Result<SyncState> {
        Ok(self.states.get(document).cloned().unwrap_or_default())
    }

    fn save(&mut self, document: &str, state: &SyncState) -> Result<()> {
        self.states.insert(document.to_string(), state.clone());
        self.saves += 1;
        Ok(())
    }
}

/// One TOML file per document under a state directory
#[derive(Debug, Clone)]
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the state for `document`
    pub fn path_for(&self, document: &str) -> PathBuf {
        let name = document.strip_suffix(".md").unwrap_or(document);
        let safe: String = name
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{safe}{STATE_SUFFIX}"))
    }
}

impl SyncStateStore for FileStateStore {
    /// Reads under a shared lock
    fn load(&self, document: &str) -> Result<SyncState> {
        let path = self.path_for(document);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no sync state yet");
            return Ok(SyncState::new());
        }

        let file = File::open(&path)?;
        file.lock_shared()?;

        // Read through the locked handle
        let mut content = String::new();
        (&file).read_to_string(&mut content)?;
        toml::from_str(&content).map_err(|e| Error::state(&path, e))
    }

    /// Writes atomically; a failed save leaves the previous file in place
    fn save(&mut self, document: &str, state: &SyncState) -> Result<()> {
        let path = self.path_for(document);
        let content = toml::to_string_pretty(state).map_err(|e| Error::state(&path, e))?;
        write_atomic(&path, content.as_bytes())?;

        tracing::debug!(
            path = %path.display(),
            identities = state.identities.len(),
            headers = state.headers.len(),
            "saved sync state"
        );
        Ok(())
    }
}
