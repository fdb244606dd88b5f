//! Completion methods for MarkoLs.

use std::path::PathBuf;

use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::ls_types::{CompletionItem, CompletionParams, CompletionResponse};

use crate::analysis::{completion_items, resolve_completion_item};
use crate::taglib::TaglibRegistry;

use super::super::{MarkoLs, uri_to_url};

impl MarkoLs {
    pub(crate) async fn completion_impl(
        &self,
        params: CompletionParams,
    ) -> Result<Option<CompletionResponse>> {
        let lsp_uri = params.text_document_position.text_document.uri;

        let Ok(uri) = uri_to_url(&lsp_uri) else {
            log::warn!("Invalid URI in completion: {}", lsp_uri.as_str());
            return Ok(None);
        };
        let Some(dir) = uri
            .to_file_path()
            .ok()
            .and_then(|path| path.parent().map(PathBuf::from))
        else {
            return Ok(None);
        };

        self.taglibs.preload(&dir).await;
        let tags = self.taglibs.tags_sorted(&dir);
        log::debug!(
            target: "marko_ls::completion",
            "Offering {} tags for {}",
            tags.len(),
            uri
        );

        Ok(Some(CompletionResponse::List(completion_items(tags))))
    }

    pub(crate) async fn completion_resolve_impl(
        &self,
        item: CompletionItem,
    ) -> Result<CompletionItem> {
        Ok(resolve_completion_item(item))
    }
}
