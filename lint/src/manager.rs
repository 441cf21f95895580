//! `LintManager` facade, the lifecycle controller hosts talk to.
//!
//! Editors (or the CLI) forward document lifecycle events here. The manager
//! owns one pipeline task per tracked document and the reconciler that holds
//! the published diagnostic set. Pipeline results arrive on a bounded channel
//! and are applied in [`LintManager::poll_events`], so all mutation of the
//! published set happens on the host's own task.

use std::collections::HashMap;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reds_types::{DiagnosticRecord, DiagnosticsSnapshot, DocumentKey};
use tokio::sync::mpsc;

use crate::diagnostics::Reconciler;
use crate::error::LintError;
use crate::notify::{NoticeLevel, Notifier};
use crate::pipeline::{PipelineEvent, PipelineHandle, Trigger};
use crate::process::ProcessRunner;
use crate::types::LintSettings;

/// Channel capacity for the event channel between pipeline tasks and the manager.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Public facade for the diagnostic pipeline.
///
/// Tracked documents live in the `pipelines` map; removing a key is what
/// stops its pipeline. Must be used from within a Tokio runtime.
pub struct LintManager {
    settings: Arc<LintSettings>,
    runner: Arc<dyn ProcessRunner>,
    notifier: Arc<dyn Notifier>,
    pipelines: HashMap<DocumentKey, PipelineHandle>,
    reconciler: Reconciler,
    workspace_roots: Vec<PathBuf>,
    event_rx: mpsc::Receiver<PipelineEvent>,
    event_tx: mpsc::Sender<PipelineEvent>,
    next_pipeline_id: u64,
}

impl LintManager {
    #[must_use]
    pub fn new(
        settings: LintSettings,
        runner: Arc<dyn ProcessRunner>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            settings: Arc::new(settings),
            runner,
            notifier,
            pipelines: HashMap::new(),
            reconciler: Reconciler::new(),
            workspace_roots: Vec::new(),
            event_rx,
            event_tx,
            next_pipeline_id: 0,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &LintSettings {
        &self.settings
    }

    /// Replace the workspace roots. Takes effect on the next trigger.
    pub fn set_workspace_roots(&mut self, roots: Vec<PathBuf>) {
        tracing::debug!(count = roots.len(), "Workspace roots updated");
        self.workspace_roots = roots;
    }

    /// Deepest workspace root containing `path`.
    #[must_use]
    pub fn workspace_root_for(&self, path: &Path) -> Option<&Path> {
        self.workspace_roots
            .iter()
            .filter(|root| path.starts_with(root))
            .max_by_key(|root| root.components().count())
            .map(PathBuf::as_path)
    }

    /// Swap settings and restart every pipeline with them.
    ///
    /// Documents that are no longer eligible are dropped and their
    /// diagnostics cleared; the others are linted again.
    pub fn reconfigure(&mut self, settings: LintSettings) {
        self.settings = Arc::new(settings);
        let keys: Vec<DocumentKey> = self.pipelines.keys().cloned().collect();
        tracing::info!(tracked = keys.len(), "Lint settings changed, restarting pipelines");

        for key in keys {
            if let Some(handle) = self.pipelines.remove(&key) {
                handle.close();
            }
            if self.settings.is_eligible(&key) {
                self.trigger(key);
            } else {
                self.reconciler.clear(key.path());
            }
        }
    }

    /// A document was opened, saved, or was already open at startup.
    ///
    /// Returns `false` when the document is not a tracked source file; no
    /// pipeline is created for it.
    pub fn on_document_visible(&mut self, path: &Path, language_id: &str) -> bool {
        let key = DocumentKey::from(path);
        if !self.settings.is_eligible(&key) {
            tracing::trace!(path = %path.display(), language_id, "Ignoring document");
            return false;
        }
        self.trigger(key);
        true
    }

    /// Stop the document's pipeline and clear its published diagnostics, even
    /// if a run is in flight.
    pub fn on_document_closed(&mut self, path: &Path) {
        let key = DocumentKey::from(path);
        if let Some(handle) = self.pipelines.remove(&key) {
            tracing::debug!(path = %path.display(), "Document closed");
            handle.close();
        }
        self.reconciler.clear(path);
    }

    fn trigger(&mut self, key: DocumentKey) {
        let trigger = Trigger {
            workspace_root: self.workspace_root_for(key.path()).map(Path::to_path_buf),
        };

        if let Some(handle) = self.pipelines.get(&key) {
            if handle.is_alive() && handle.notify(trigger.clone()) {
                return;
            }
            tracing::warn!(path = %key, "Pipeline task ended unexpectedly, respawning");
        }

        self.next_pipeline_id += 1;
        let handle = PipelineHandle::spawn(
            self.next_pipeline_id,
            key.clone(),
            Arc::clone(&self.settings),
            Arc::clone(&self.runner),
            self.event_tx.clone(),
        );
        handle.notify(trigger);
        if let Some(old) = self.pipelines.insert(key, handle) {
            old.close();
        }
    }

    /// Drain pending pipeline results, up to `budget`.
    ///
    /// This is non-blocking and returns immediately if nothing is pending.
    pub fn poll_events(&mut self, budget: usize) -> usize {
        let mut count = 0;
        while count < budget {
            match self.event_rx.try_recv() {
                Ok(event) => {
                    self.handle_event(event);
                    count += 1;
                }
                Err(mpsc::error::TryRecvError::Empty | mpsc::error::TryRecvError::Disconnected) => {
                    break;
                }
            }
        }
        count
    }

    fn handle_event(&mut self, event: PipelineEvent) {
        let PipelineEvent {
            key,
            pipeline,
            generation,
            result,
        } = event;

        // Closed documents and replaced pipelines report into the void.
        let Some(handle) = self.pipelines.get_mut(&key) else {
            tracing::trace!(path = %key, "Discarding result for untracked document");
            return;
        };
        if handle.id() != pipeline || !handle.accept(generation) {
            tracing::trace!(path = %key, generation, "Discarding stale result");
            return;
        }

        match result {
            Ok(outcome) => {
                tracing::debug!(
                    path = %key,
                    count = outcome.records.len(),
                    "Diagnostics updated"
                );
                self.reconciler.publish(outcome.records, &outcome.base_dir);
            }
            Err(LintError::Configuration(err)) => {
                tracing::warn!(path = %key, setting = err.setting(), "Lint skipped: {err}");
                self.notifier.notify(NoticeLevel::Error, &err.to_string());
            }
            Err(LintError::Process(err)) => {
                tracing::error!(path = %key, "Lint run failed: {err}");
                self.notifier.notify(NoticeLevel::Error, &err.to_string());
                self.reconciler.clear(key.path());
            }
        }
    }

    /// Immutable snapshot of the published diagnostic set.
    #[must_use]
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        self.reconciler.snapshot()
    }

    /// Latest published diagnostics for one file; empty before the first
    /// successful run.
    #[must_use]
    pub fn current_diagnostics(&self, path: &Path) -> &[DiagnosticRecord] {
        self.reconciler.get(path).unwrap_or_default()
    }

    /// Files whose published diagnostics changed since the last call. An
    /// empty record list means the file's diagnostics were cleared.
    pub fn take_changes(&mut self) -> Vec<(PathBuf, Vec<DiagnosticRecord>)> {
        self.reconciler.take_changes()
    }

    #[must_use]
    pub fn is_tracked(&self, path: &Path) -> bool {
        self.pipelines.contains_key(&DocumentKey::from(path))
    }

    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.pipelines.len()
    }

    /// Cancel all in-flight work and clear every published diagnostic.
    pub fn shutdown(&mut self) {
        let pipelines = mem::take(&mut self.pipelines);
        tracing::info!(count = pipelines.len(), "Stopping lint pipelines");
        for (_, handle) in pipelines {
            handle.close();
        }
        while self.event_rx.try_recv().is_ok() {}
        self.reconciler.clear_all();
    }

    #[cfg(test)]
    pub(crate) fn event_tx(&self) -> &mpsc::Sender<PipelineEvent> {
        &self.event_tx
    }

    #[cfg(test)]
    pub(crate) fn pipeline_id(&self, path: &Path) -> Option<u64> {
        self.pipelines.get(&DocumentKey::from(path)).map(PipelineHandle::id)
    }
}
