//! SyncEngine: pull, push and full cycles against one document
//!
//! Every cycle stages its work on a [`Snapshot`] of the task store, the
//! dependency links and the sync state. The stores are only touched at the
//! end, in a fixed order: task store, dependency store, state store. A cycle
//! that fails before the remote write therefore leaves everything as it was.

mod pull;
mod push;
mod snapshot;

use tasksync_content::{Priority, SyntaxCodec, TaskRecord};

use crate::config::SyncConfig;
use crate::diagnostics::SyncReport;
use crate::headers::HeaderOrganizer;
use crate::identity::IdentityResolver;
use crate::remote::RemoteDocument;
use crate::state::{SyncState, SyncStateStore};
use crate::store::{DependencyStore, TaskStore};
use crate::{Error, Result};

use snapshot::Snapshot;

/// Which halves of a cycle run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleMode {
    /// Pull, then push
    #[default]
    Full,
    /// Merge the document into the store; never write the document
    PullOnly,
    /// Render the store into the document; ignore edits in it
    PushOnly,
}

/// Orchestrates sync cycles under one configuration
pub struct SyncEngine {
    config: SyncConfig,
    syntax: SyntaxCodec,
    resolver: IdentityResolver,
    headers: HeaderOrganizer,
    dependencies: Option<Box<dyn DependencyStore>>,
}

impl SyncEngine {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            syntax: SyntaxCodec::new(config.display.clone()),
            resolver: IdentityResolver::new(config.matching),
            headers: HeaderOrganizer::new(config.display.header_level()),
            config,
            dependencies: None,
        }
    }

    /// Enable nesting: indentation is read into and rendered from `deps`.
    /// Without a dependency store every task renders at depth zero.
    pub fn with_dependencies(mut self, deps: Box<dyn DependencyStore>) -> Self {
        self.dependencies = Some(deps);
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn dependencies(&self) -> Option<&dyn DependencyStore> {
        self.dependencies.as_deref()
    }

    fn dependencies_mut(&mut self) -> Option<&mut dyn DependencyStore> {
        match &mut self.dependencies {
            Some(deps) => Some(deps.as_mut()),
            None => None,
        }
    }

    /// Merge `document` into `store` and `state`.
    ///
    /// `None` means the document does not exist. Pruning is suppressed for
    /// a missing or blank document.
    ///
    /// # Errors
    ///
    /// Returns a store error if the store cannot be read or updated; `state`
    /// is only replaced after the store was updated.
    pub fn pull(
        &mut self,
        document: Option<&str>,
        store: &mut dyn TaskStore,
        state: &mut SyncState,
    ) -> Result<SyncReport> {
        let mut snap = Snapshot::load(&*store, self.dependencies(), state.clone())?;
        let mut report = SyncReport::default();
        self.pull_into(document, &mut snap, &mut report)?;
        snap.summarize(&mut report);
        *state = snap.commit(store, self.dependencies_mut())?;
        Ok(report)
    }

    /// Render `store` into `template` and return the new document text.
    ///
    /// Pass-through lines of the template are kept; every task line is
    /// replaced by the store's tasks.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or a header cannot be
    /// synthesized.
    pub fn push(
        &mut self,
        template: Option<&str>,
        store: &mut dyn TaskStore,
        state: &mut SyncState,
    ) -> Result<(String, SyncReport)> {
        let mut snap = Snapshot::load(&*store, self.dependencies(), state.clone())?;
        let mut report = SyncReport::default();
        let text = self.push_from(template, &mut snap, &mut report)?;
        *state = snap.commit(store, self.dependencies_mut())?;
        Ok((text, report))
    }

    /// Fetch, pull, push, replace, commit
    pub fn sync(
        &mut self,
        remote: &mut dyn RemoteDocument,
        store: &mut dyn TaskStore,
        states: &mut dyn SyncStateStore,
    ) -> Result<SyncReport> {
        self.run(CycleMode::Full, remote, store, states)
    }

    pub fn pull_only(
        &mut self,
        remote: &mut dyn RemoteDocument,
        store: &mut dyn TaskStore,
        states: &mut dyn SyncStateStore,
    ) -> Result<SyncReport> {
        self.run(CycleMode::PullOnly, remote, store, states)
    }

    pub fn push_only(
        &mut self,
        remote: &mut dyn RemoteDocument,
        store: &mut dyn TaskStore,
        states: &mut dyn SyncStateStore,
    ) -> Result<SyncReport> {
        self.run(CycleMode::PushOnly, remote, store, states)
    }

    /// Run one cycle against `remote`.
    ///
    /// # Errors
    ///
    /// - `TransientIo` if the fetch fails; nothing was changed
    /// - `PartialWrite` if the document replace fails; the stores and the
    ///   state are left untouched but the remote content is unknown
    /// - store and state errors from the final commit
    pub fn run(
        &mut self,
        mode: CycleMode,
        remote: &mut dyn RemoteDocument,
        store: &mut dyn TaskStore,
        states: &mut dyn SyncStateStore,
    ) -> Result<SyncReport> {
        let document = remote.name().to_string();
        let span = tracing::info_span!("sync_cycle", document = %document, mode = ?mode);
        let _enter = span.enter();

        let fetched = remote.fetch().map_err(|e| {
            tracing::error!(error = %e, "fetch failed, cycle aborted");
            Error::transient("fetch", e)
        })?;

        let state = states.load(&document)?;
        let mut snap = Snapshot::load(&*store, self.dependencies(), state)?;
        let mut report = SyncReport::default();

        if mode != CycleMode::PushOnly {
            self.pull_into(fetched.as_deref(), &mut snap, &mut report)?;
        }

        if mode != CycleMode::PullOnly {
            let text = self.push_from(fetched.as_deref(), &mut snap, &mut report)?;
            let unchanged = match &fetched {
                Some(current) => *current == text,
                None => text.is_empty(),
            };
            if !unchanged {
                remote.replace(&text).map_err(|e| {
                    tracing::error!(error = %e, "document write failed, nothing committed");
                    Error::partial_write(e)
                })?;
                report.document_written = true;
            }
        }

        snap.summarize(&mut report);
        let state = snap.commit(store, self.dependencies_mut())?;
        states.save(&document, &state)?;

        tracing::info!(
            created = report.created.len(),
            updated = report.updated.len(),
            deleted = report.deleted.len(),
            written = report.document_written,
            diagnostics = report.diagnostics.len(),
            "sync cycle complete"
        );
        Ok(report)
    }

    /// The document a full cycle would write, without writing anything
    ///
    /// # Errors
    ///
    /// Returns `TransientIo` if the fetch fails.
    pub fn preview(
        &self,
        remote: &mut dyn RemoteDocument,
        store: &dyn TaskStore,
        states: &dyn SyncStateStore,
    ) -> Result<(String, SyncReport)> {
        let fetched = remote
            .fetch()
            .map_err(|e| Error::transient("fetch", e))?;
        let state = states.load(remote.name())?;
        let mut snap = Snapshot::load(store, self.dependencies(), state)?;
        let mut report = SyncReport::default();

        self.pull_into(fetched.as_deref(), &mut snap, &mut report)?;
        let text = self.push_from(fetched.as_deref(), &mut snap, &mut report)?;
        snap.summarize(&mut report);
        Ok((text, report))
    }

    /// Quick capture: append one rendered line to the document.
    ///
    /// The task gets its id on the next pull, like any line typed by hand.
    /// Fields the configured dialects hide are not written, and tags are
    /// written in their canonical form.
    ///
    /// # Errors
    ///
    /// Returns `TransientIo` if the append fails.
    pub fn capture(
        &self,
        remote: &mut dyn RemoteDocument,
        text: &str,
        priority: Option<Priority>,
        tags: &[String],
    ) -> Result<String> {
        let mut draft = TaskRecord::draft(text.trim()).with_tags(tags.iter().cloned());
        draft.priority = priority;
        let line = self.syntax.render(&draft);

        remote.append(&line).map_err(|e| {
            tracing::error!(error = %e, "append failed");
            Error::transient("append", e)
        })?;
        tracing::info!(document = remote.name(), line = %line, "captured task");
        Ok(line)
    }
}
