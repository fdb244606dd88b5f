use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::Value;
use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::ls_types::*;
use tower_lsp_server::{Client, LanguageServer};
use url::Url;

use crate::config::WorkspaceSettings;
use crate::document::{Document, DocumentStore};
use crate::taglib::loader::{MARKO_TAG_FILE, PACKAGE_JSON, TAGLIB_FILE};
use crate::taglib::{DiscoveryOptions, TaglibCache};
use crate::text::apply_content_changes;

use super::settings::{
    PROJECT_CONFIG_FILE, SettingsEvent, SettingsEventKind, SettingsSource, load_settings,
};

mod text_document;

/// Characters after which editors should ask for tag completions.
pub const TRIGGER_CHARACTERS: &[&str] = &[".", ":", "<", "\"", "'", "/", "@", "*"];

/// Convert `ls_types::Uri` to `url::Url`.
pub(crate) fn uri_to_url(uri: &Uri) -> std::result::Result<Url, url::ParseError> {
    Url::parse(uri.as_str())
}

/// Convert `url::Url` to `ls_types::Uri`.
pub(crate) fn url_to_uri(url: &Url) -> Option<Uri> {
    Uri::from_str(url.as_str()).ok()
}

pub struct MarkoLs {
    client: Client,
    documents: DocumentStore,
    taglibs: TaglibCache,
    settings: ArcSwap<WorkspaceSettings>,
    root_path: ArcSwap<Option<PathBuf>>,
    /// Settings sent by the client, replayed on every reload.
    initialization_options: ArcSwap<Option<Value>>,
    client_configuration: ArcSwap<Option<Value>>,
}

impl std::fmt::Debug for MarkoLs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkoLs")
            .field("documents", &"DocumentStore")
            .field("taglibs", &self.taglibs)
            .field("settings", &self.settings.load())
            .field("root_path", &self.root_path.load())
            .finish()
    }
}

impl MarkoLs {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: DocumentStore::new(),
            taglibs: TaglibCache::default(),
            settings: ArcSwap::new(Arc::new(WorkspaceSettings::default())),
            root_path: ArcSwap::new(Arc::new(None)),
            initialization_options: ArcSwap::new(Arc::new(None)),
            client_configuration: ArcSwap::new(Arc::new(None)),
        }
    }

    /// Settings currently in effect.
    pub fn settings(&self) -> Arc<WorkspaceSettings> {
        self.settings.load_full()
    }

    pub fn root_path(&self) -> Option<PathBuf> {
        (**self.root_path.load()).clone()
    }

    fn apply_settings(&self, settings: WorkspaceSettings) {
        self.taglibs.set_options(DiscoveryOptions::from(&settings));
        self.settings.store(Arc::new(settings));
    }

    /// Rebuild settings from disk and the stored client layers.
    async fn reload_settings(&self) {
        let root = self.root_path();
        let client_layers: Vec<(SettingsSource, Value)> = [
            (
                SettingsSource::InitializationOptions,
                self.initialization_options.load_full(),
            ),
            (
                SettingsSource::ClientConfiguration,
                self.client_configuration.load_full(),
            ),
        ]
        .into_iter()
        .filter_map(|(source, value)| Some((source, (*value).clone()?)))
        .collect();

        let outcome = load_settings(root.as_deref(), &client_layers);
        self.report_settings_events(&outcome.events).await;
        if let Some(settings) = outcome.settings {
            self.apply_settings(settings);
        }
    }

    async fn report_settings_events(&self, events: &[SettingsEvent]) {
        for event in events {
            let message_type = match event.kind {
                SettingsEventKind::Info => MessageType::INFO,
                SettingsEventKind::Warning => MessageType::WARNING,
            };
            self.client
                .log_message(message_type, event.message.clone())
                .await;
        }
    }
}

/// Workspace root from the first workspace folder, then the root URI, then
/// the deprecated root path, then the current directory.
fn workspace_root(params: &InitializeParams) -> Option<(PathBuf, &'static str)> {
    if let Some(folder) = params.workspace_folders.as_ref().and_then(|f| f.first()) {
        return uri_to_path(&folder.uri).map(|path| (path, "workspace folders"));
    }

    #[allow(deprecated)]
    if let Some(root_uri) = &params.root_uri {
        return uri_to_path(root_uri).map(|path| (path, "root_uri"));
    }

    #[allow(deprecated)]
    if let Some(root_path) = &params.root_path {
        return Some((PathBuf::from(root_path), "root_path (deprecated)"));
    }

    std::env::current_dir()
        .ok()
        .map(|path| (path, "current working directory (fallback)"))
}

fn uri_to_path(uri: &Uri) -> Option<PathBuf> {
    uri_to_url(uri).ok()?.to_file_path().ok()
}

/// Files whose change can alter which tags a project has.
fn is_taglib_source(path: &Path) -> bool {
    matches!(
        path.file_name().and_then(|name| name.to_str()),
        Some(TAGLIB_FILE | MARKO_TAG_FILE | PACKAGE_JSON)
    ) || path.extension().is_some_and(|ext| ext == "marko")
}

impl LanguageServer for MarkoLs {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        self.client
            .log_message(MessageType::INFO, "Received initialization request")
            .await;

        match workspace_root(&params) {
            Some((path, source)) => {
                self.client
                    .log_message(
                        MessageType::INFO,
                        format!("Using workspace root from {}: {}", source, path.display()),
                    )
                    .await;
                self.root_path.store(Arc::new(Some(path)));
            }
            None => {
                self.client
                    .log_message(
                        MessageType::WARNING,
                        format!(
                            "Failed to determine workspace root - {} will not be loaded",
                            PROJECT_CONFIG_FILE
                        ),
                    )
                    .await;
            }
        }

        self.initialization_options
            .store(Arc::new(params.initialization_options));
        self.reload_settings().await;

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "marko-ls".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::INCREMENTAL),
                        ..Default::default()
                    },
                )),
                definition_provider: Some(OneOf::Left(true)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(true),
                    trigger_characters: Some(
                        TRIGGER_CHARACTERS.iter().map(|c| c.to_string()).collect(),
                    ),
                    ..Default::default()
                }),
                ..ServerCapabilities::default()
            },
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let watchers = [TAGLIB_FILE, MARKO_TAG_FILE, PACKAGE_JSON, "*.marko"]
            .iter()
            .map(|file| FileSystemWatcher {
                glob_pattern: GlobPattern::String(format!("**/{}", file)),
                kind: None,
            })
            .collect();
        let registration = Registration {
            id: "marko-ls/watch-taglibs".to_string(),
            method: "workspace/didChangeWatchedFiles".to_string(),
            register_options: serde_json::to_value(DidChangeWatchedFilesRegistrationOptions {
                watchers,
            })
            .ok(),
        };
        if let Err(err) = self.client.register_capability(vec![registration]).await {
            log::debug!(target: "marko_ls::lsp", "File watcher registration failed: {}", err);
        }

        self.client
            .log_message(MessageType::INFO, "server is ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        self.taglibs.clear();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let text_document = params.text_document;
        let Ok(uri) = uri_to_url(&text_document.uri) else {
            log::warn!("Invalid URI in didOpen: {}", text_document.uri.as_str());
            return;
        };

        log::debug!(target: "marko_ls::sync", "Opened {} (version {})", uri, text_document.version);
        self.documents.insert(
            uri,
            Document::opened(
                text_document.text,
                text_document.version,
                text_document.language_id,
            ),
        );
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let Ok(uri) = uri_to_url(&params.text_document.uri) else {
            log::warn!(
                "Invalid URI in didChange: {}",
                params.text_document.uri.as_str()
            );
            return;
        };

        let Some(old_text) = self.documents.get_document_text(&uri) else {
            self.client
                .log_message(MessageType::WARNING, "Document not found for change event")
                .await;
            return;
        };

        let text = apply_content_changes(&old_text, params.content_changes);
        self.documents
            .update_text(&uri, text, Some(params.text_document.version));
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let Ok(uri) = uri_to_url(&params.text_document.uri) else {
            log::warn!(
                "Invalid URI in didClose: {}",
                params.text_document.uri.as_str()
            );
            return;
        };
        self.documents.remove(&uri);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        // Null settings keep the last configuration
        if !params.settings.is_null() {
            self.client_configuration
                .store(Arc::new(Some(params.settings)));
        }
        self.reload_settings().await;
        self.taglibs.clear();
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let mut taglibs_changed = false;
        let mut config_changed = false;
        for change in &params.changes {
            let Some(path) = uri_to_path(&change.uri) else {
                continue;
            };
            taglibs_changed |= is_taglib_source(&path);
            config_changed |= path
                .file_name()
                .is_some_and(|name| name == PROJECT_CONFIG_FILE);
        }

        if config_changed {
            self.reload_settings().await;
        }
        if taglibs_changed || config_changed {
            log::debug!(target: "marko_ls::lsp", "Taglib sources changed; clearing cache");
            self.taglibs.clear();
        }
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        self.goto_definition_impl(params).await
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        self.completion_impl(params).await
    }

    async fn completion_resolve(&self, item: CompletionItem) -> Result<CompletionItem> {
        self.completion_resolve_impl(item).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_and_url_convert_both_ways() {
        let url = Url::parse("file:///project/components/app.marko").unwrap();
        let uri = url_to_uri(&url).unwrap();
        assert_eq!(uri.as_str(), "file:///project/components/app.marko");
        assert_eq!(uri_to_url(&uri).unwrap(), url);
    }

    #[test]
    fn taglib_sources_are_recognized() {
        assert!(is_taglib_source(Path::new("/p/marko.json")));
        assert!(is_taglib_source(Path::new("/p/components/card/marko-tag.json")));
        assert!(is_taglib_source(Path::new("/p/package.json")));
        assert!(is_taglib_source(Path::new("/p/components/new-tag.marko")));
        assert!(!is_taglib_source(Path::new("/p/component.js")));
    }

    #[test]
    fn workspace_root_prefers_folders() {
        let folder_uri = Uri::from_str("file:///workspace").unwrap();
        let params = InitializeParams {
            workspace_folders: Some(vec![WorkspaceFolder {
                uri: folder_uri,
                name: "workspace".to_string(),
            }]),
            ..Default::default()
        };
        let (path, source) = workspace_root(&params).unwrap();
        assert_eq!(path, PathBuf::from("/workspace"));
        assert_eq!(source, "workspace folders");
    }

    #[test]
    fn workspace_root_falls_back_to_current_dir() {
        let (path, source) = workspace_root(&InitializeParams::default()).unwrap();
        assert_eq!(path, std::env::current_dir().unwrap());
        assert_eq!(source, "current working directory (fallback)");
    }
}
