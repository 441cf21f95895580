//! Per-document lint pipeline.
//!
//! One task per document key consumes an ordered trigger queue:
//!
//! ```text
//! trigger -> debounce (restart window on every trigger) -> lint run -> event
//!                ^                                            |
//!                +------------ trigger while in flight -------+ (run cancelled)
//! ```
//!
//! A trigger that arrives while a run is in flight drops that run's future,
//! which kills the child process. At most one run per key is therefore alive,
//! and a result is only ever produced by the newest trigger.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reds_types::{DiagnosticRecord, DocumentKey};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;

use crate::error::LintError;
use crate::parser::parse_output;
use crate::process::ProcessRunner;
use crate::types::LintSettings;

/// Records from one successful lint run.
#[derive(Debug, Clone)]
pub struct LintOutcome {
    pub records: Vec<DiagnosticRecord>,
    /// Directory relative file names in `records` are resolved against.
    pub base_dir: PathBuf,
}

/// Lint a single document once: validate configuration, run the compiler,
/// parse the configured stream.
///
/// The source path handed to the compiler is the workspace root when the
/// document lives in one, the document itself otherwise.
pub async fn lint_document(
    settings: &LintSettings,
    runner: &dyn ProcessRunner,
    key: &DocumentKey,
    workspace_root: Option<&Path>,
) -> Result<LintOutcome, LintError> {
    let source = workspace_root.unwrap_or(key.path());
    let command = settings.lint_command(source, workspace_root)?;

    let output = runner.run(&command).await?;
    let records = parse_output(output.stream(settings.stream()), settings.grammar());

    let base_dir = match workspace_root {
        Some(root) => root.to_path_buf(),
        None => key
            .path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    Ok(LintOutcome { records, base_dir })
}

/// Context captured when a document becomes eligible for linting.
#[derive(Debug, Clone, Default)]
pub(crate) struct Trigger {
    pub workspace_root: Option<PathBuf>,
}

/// Result of one lint run, tagged so the manager can drop anything stale.
#[derive(Debug)]
pub(crate) struct PipelineEvent {
    pub key: DocumentKey,
    pub pipeline: u64,
    pub generation: u64,
    pub result: Result<LintOutcome, LintError>,
}

/// Handle to a running pipeline task. Dropping the handle does not stop the
/// task; call [`PipelineHandle::close`].
pub(crate) struct PipelineHandle {
    id: u64,
    trigger_tx: mpsc::UnboundedSender<Trigger>,
    task: JoinHandle<()>,
    /// Highest generation the manager has applied for this pipeline.
    applied: u64,
}

impl PipelineHandle {
    pub fn spawn(
        id: u64,
        key: DocumentKey,
        settings: Arc<LintSettings>,
        runner: Arc<dyn ProcessRunner>,
        event_tx: mpsc::Sender<PipelineEvent>,
    ) -> Self {
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_pipeline(
            id, key, settings, runner, trigger_rx, event_tx,
        ));
        Self {
            id,
            trigger_tx,
            task,
            applied: 0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Queue a trigger. Returns `false` if the task is gone.
    pub fn notify(&self, trigger: Trigger) -> bool {
        self.trigger_tx.send(trigger).is_ok()
    }

    pub fn is_alive(&self) -> bool {
        !self.task.is_finished() && !self.trigger_tx.is_closed()
    }

    /// Record that `generation` was applied; returns `false` if it is older
    /// than something already applied.
    pub fn accept(&mut self, generation: u64) -> bool {
        if generation < self.applied {
            return false;
        }
        self.applied = generation;
        true
    }

    /// Stop the task, killing any in-flight process.
    pub fn close(self) {
        self.task.abort();
    }
}

async fn run_pipeline(
    id: u64,
    key: DocumentKey,
    settings: Arc<LintSettings>,
    runner: Arc<dyn ProcessRunner>,
    mut trigger_rx: mpsc::UnboundedReceiver<Trigger>,
    event_tx: mpsc::Sender<PipelineEvent>,
) {
    let mut generation = 0u64;
    let mut pending: Option<Trigger> = None;

    loop {
        let first = match pending.take() {
            Some(trigger) => trigger,
            None => match trigger_rx.recv().await {
                Some(trigger) => trigger,
                None => break,
            },
        };
        let Some(trigger) = debounce(&settings, &mut trigger_rx, first).await else {
            break;
        };

        generation += 1;
        tracing::debug!(path = %key, generation, "Linting document");

        let run = lint_document(
            &settings,
            runner.as_ref(),
            &key,
            trigger.workspace_root.as_deref(),
        );
        tokio::select! {
            next = trigger_rx.recv() => match next {
                Some(next) => {
                    tracing::debug!(path = %key, generation, "Lint run superseded");
                    pending = Some(next);
                }
                None => break,
            },
            result = run => {
                let event = PipelineEvent {
                    key: key.clone(),
                    pipeline: id,
                    generation,
                    result,
                };
                if event_tx.send(event).await.is_err() {
                    break;
                }
            }
        }
    }
    tracing::trace!(path = %key, "Pipeline stopped");
}

/// Collapse triggers that arrive within the window, keeping the last one.
/// Returns `None` when the queue closed.
async fn debounce(
    settings: &LintSettings,
    trigger_rx: &mut mpsc::UnboundedReceiver<Trigger>,
    mut latest: Trigger,
) -> Option<Trigger> {
    loop {
        match time::timeout(settings.debounce(), trigger_rx.recv()).await {
            Ok(Some(next)) => latest = next,
            Ok(None) => return None,
            Err(_) => return Some(latest),
        }
    }
}
