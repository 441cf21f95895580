//! The `LanguageServer` implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reds_config::RedsConfig;
use reds_lint::{LintManager, LintSettings, SystemRunner};
use reds_types::{DiagnosticRecord, DiagnosticsSnapshot};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    DidCloseTextDocumentParams, DidOpenTextDocumentParams, DidSaveTextDocumentParams,
    InitializeParams, InitializeResult, InitializedParams, MessageType, ServerCapabilities,
    ServerInfo, TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
    TextDocumentSyncSaveOptions,
};
use tower_lsp::{Client, LanguageServer};

use crate::conversion::{path_to_url, to_lsp_diagnostic, url_to_path};
use crate::notifier::ClientNotifier;

/// How often pipeline results are applied and published.
const DRIVER_TICK: Duration = Duration::from_millis(25);

/// Pipeline results applied per tick.
const EVENT_BUDGET: usize = 64;

/// Options fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    /// Replaces `~/.reds/config.toml` as the user config file.
    pub config_path: Option<PathBuf>,
}

/// The LSP backend.
pub struct Backend {
    client: Client,
    options: ServeOptions,
    manager: Arc<Mutex<LintManager>>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl Backend {
    /// Settings start empty; the real configuration is loaded in `initialize`
    /// once the workspace is known.
    pub fn new(client: Client, options: ServeOptions) -> Self {
        let notifier = Arc::new(ClientNotifier::new(client.clone()));
        let manager = LintManager::new(LintSettings::default(), Arc::new(SystemRunner), notifier);
        Self {
            client,
            options,
            manager: Arc::new(Mutex::new(manager)),
            driver: Mutex::new(None),
        }
    }

    /// Currently published diagnostics.
    pub async fn snapshot(&self) -> DiagnosticsSnapshot {
        self.manager.lock().await.snapshot()
    }

    async fn reload_config(&self, roots: Vec<PathBuf>) {
        let workspace = roots.first().cloned();
        let loaded = RedsConfig::load(self.options.config_path.as_deref(), workspace.as_deref());

        let mut manager = self.manager.lock().await;
        manager.set_workspace_roots(roots);
        match loaded {
            Ok(config) => {
                manager.reconfigure(config.lint_settings());
                tracing::info!("Configuration loaded");
            }
            Err(err) => {
                drop(manager);
                tracing::error!("{err}");
                self.client
                    .show_message(MessageType::ERROR, err.to_string())
                    .await;
            }
        }
    }

    async fn publish_pending(&self) {
        let changes = self.manager.lock().await.take_changes();
        publish_changes(&self.client, changes).await;
    }
}

async fn publish_changes(client: &Client, changes: Vec<(PathBuf, Vec<DiagnosticRecord>)>) {
    for (path, records) in changes {
        let Some(uri) = path_to_url(&path) else {
            tracing::debug!(path = %path.display(), "Skipping diagnostics for non-absolute path");
            continue;
        };
        let diagnostics = records.iter().map(to_lsp_diagnostic).collect();
        client.publish_diagnostics(uri, diagnostics, None).await;
    }
}

/// Apply pipeline results and push whatever changed, forever.
async fn drive(client: Client, manager: Arc<Mutex<LintManager>>) {
    let mut ticker = time::interval(DRIVER_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let changes = {
            let mut manager = manager.lock().await;
            manager.poll_events(EVENT_BUDGET);
            manager.take_changes()
        };
        publish_changes(&client, changes).await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("reds language server initializing...");

        let mut roots: Vec<PathBuf> = params
            .workspace_folders
            .iter()
            .flatten()
            .filter_map(|folder| url_to_path(&folder.uri))
            .collect();
        if roots.is_empty() {
            #[allow(deprecated)]
            let root_uri = params.root_uri.as_ref();
            roots.extend(root_uri.and_then(url_to_path));
        }
        self.reload_config(roots).await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::NONE),
                        save: Some(TextDocumentSyncSaveOptions::Supported(true)),
                        ..Default::default()
                    },
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "reds".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let handle = tokio::spawn(drive(self.client.clone(), Arc::clone(&self.manager)));
        if let Some(previous) = self.driver.lock().await.replace(handle) {
            previous.abort();
        }
        tracing::info!("reds language server initialized");
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("reds language server shutting down...");
        if let Some(driver) = self.driver.lock().await.take() {
            driver.abort();
        }
        self.manager.lock().await.shutdown();
        self.publish_pending().await;
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        tracing::debug!("Document opened: {}", document.uri);
        let Some(path) = url_to_path(&document.uri) else {
            return;
        };
        self.manager
            .lock()
            .await
            .on_document_visible(&path, &document.language_id);
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        tracing::debug!("Document saved: {}", params.text_document.uri);
        let Some(path) = url_to_path(&params.text_document.uri) else {
            return;
        };
        self.manager.lock().await.on_document_visible(&path, "");
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        tracing::debug!("Document closed: {}", params.text_document.uri);
        let Some(path) = url_to_path(&params.text_document.uri) else {
            return;
        };
        self.manager.lock().await.on_document_closed(&path);
        self.publish_pending().await;
    }
}
