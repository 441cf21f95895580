//! Language server for redscript.
//!
//! Forwards document lifecycle notifications to the lint pipeline and pushes
//! the resulting diagnostics back with `textDocument/publishDiagnostics`.

mod backend;
pub mod conversion;
mod notifier;

pub use backend::{Backend, ServeOptions};

use tokio::io;
use tower_lsp::{LspService, Server};

/// Serve over stdin/stdout until the client disconnects.
pub async fn run(options: ServeOptions) {
    tracing::info!("reds language server starting...");

    let stdin = io::stdin();
    let stdout = io::stdout();

    let (service, socket) = LspService::new(|client| Backend::new(client, options));
    Server::new(stdin, stdout, socket).serve(service).await;

    tracing::info!("reds language server stopped");
}
