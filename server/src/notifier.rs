use reds_lint::{NoticeLevel, Notifier};
use tower_lsp::Client;
use tower_lsp::lsp_types::MessageType;

/// Shows pipeline notices in the editor (`window/showMessage`) and appends
/// them to its output log (`window/logMessage`).
pub(crate) struct ClientNotifier {
    client: Client,
}

impl ClientNotifier {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Notifier for ClientNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        let kind = match level {
            NoticeLevel::Info => MessageType::INFO,
            NoticeLevel::Warning => MessageType::WARNING,
            NoticeLevel::Error => MessageType::ERROR,
        };
        let client = self.client.clone();
        let message = message.to_string();
        // Called with the manager locked; never wait on the client here.
        tokio::spawn(async move {
            client.show_message(kind, message.clone()).await;
            client.log_message(kind, message).await;
        });
    }
}
