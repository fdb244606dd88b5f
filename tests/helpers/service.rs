//! In-process server construction for handler-level tests.

use futures::StreamExt;
use marko_ls::MarkoLs;
use tower_lsp_server::LspService;

/// Build a service whose client socket is drained in the background.
///
/// Server-to-client messages go through a bounded channel, so without a
/// reader the second `window/logMessage` blocks the handler forever.
/// Requests from the server are dropped unanswered.
pub fn marko_service() -> LspService<MarkoLs> {
    let (service, socket) = LspService::new(MarkoLs::new);
    tokio::spawn(socket.for_each(|_| async {}));
    service
}
