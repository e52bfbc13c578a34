//! Structured conditions raised during a sync cycle, and the cycle report

use std::fmt;

use serde::{Deserialize, Serialize};

/// How serious a reported condition is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Why pruning was skipped this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressReason {
    /// The fetch returned an empty document
    EmptyDocument,
    /// The remote has no such document
    DocumentNotFound,
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDocument => f.write_str("document is empty"),
            Self::DocumentNotFound => f.write_str("document not found"),
        }
    }
}

/// A non-fatal condition reported by a sync cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A second line normalized to a key already claimed in this pass and
    /// was given its own identity
    AmbiguousIdentity {
        key: String,
        id: String,
        occurrence: usize,
    },
    /// Parent links form a cycle; the members were rendered flat
    StructuralCycle { ids: Vec<String> },
    /// Unmatched identities were kept because the fetched document was
    /// empty or missing
    PruningSuppressed {
        candidates: usize,
        reason: SuppressReason,
    },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Self::StructuralCycle { .. } => Severity::Error,
            Self::AmbiguousIdentity { .. } | Self::PruningSuppressed { .. } => Severity::Warning,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousIdentity {
                key,
                id,
                occurrence,
            } => write!(
                f,
                "duplicate task text '{key}' (occurrence {occurrence}) tracked as {id}"
            ),
            Self::StructuralCycle { ids } => {
                write!(f, "dependency cycle rendered flat: {}", ids.join(" -> "))
            }
            Self::PruningSuppressed { candidates, reason } => write!(
                f,
                "kept {candidates} unmatched task(s) because the {reason}"
            ),
        }
    }
}

/// Outcome of one sync cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Ids minted for new document lines
    pub created: Vec<String>,
    /// Ids whose record changed
    pub updated: Vec<String>,
    /// Ids removed from the store
    pub deleted: Vec<String>,
    /// Whether the remote document was replaced
    pub document_written: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl SyncReport {
    /// Record a diagnostic once and log it
    pub fn raise(&mut self, diagnostic: Diagnostic) {
        if self.diagnostics.contains(&diagnostic) {
            return;
        }
        match diagnostic.severity() {
            Severity::Error => tracing::error!(%diagnostic, "sync diagnostic"),
            Severity::Warning => tracing::warn!(%diagnostic, "sync diagnostic"),
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity() == Severity::Error)
    }

    /// Whether the cycle changed nothing
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
            && self.updated.is_empty()
            && self.deleted.is_empty()
            && !self.document_written
    }
}
