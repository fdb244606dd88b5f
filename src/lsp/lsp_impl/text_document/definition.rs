//! Goto definition method for MarkoLs.

use tower_lsp_server::jsonrpc::{Error, Result};
use tower_lsp_server::ls_types::{
    GotoDefinitionParams, GotoDefinitionResponse, Location, MessageType,
};

use crate::analysis::{DefinitionTarget, resolve_definition};
use crate::error::LspError;

use super::super::{MarkoLs, uri_to_url, url_to_uri};

fn target_to_location(target: DefinitionTarget) -> Option<Location> {
    Some(Location {
        uri: url_to_uri(&target.uri)?,
        range: target.range,
    })
}

impl MarkoLs {
    pub(crate) async fn goto_definition_impl(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let lsp_uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Ok(uri) = uri_to_url(&lsp_uri) else {
            log::warn!("Invalid URI in gotoDefinition: {}", lsp_uri.as_str());
            return Ok(None);
        };
        let Ok(document_path) = uri.to_file_path() else {
            log::debug!(target: "marko_ls::definition", "Not a file URI: {}", uri);
            return Ok(None);
        };

        // Copy the text out so no store lock is held across awaits
        let snapshot = self.documents.get(&uri).map(|document| {
            let offset = document.position_mapper().position_to_byte(position);
            (document.text().to_string(), offset)
        });
        let Some((text, offset)) = snapshot else {
            self.client
                .log_message(MessageType::INFO, "No document found")
                .await;
            return Ok(None);
        };
        let Some(offset) = offset else {
            return Ok(None);
        };

        if let Some(dir) = document_path.parent() {
            self.taglibs.preload(dir).await;
        }
        let settings = self.settings();
        match resolve_definition(&self.taglibs, &document_path, &text, offset, &settings).await {
            Ok(targets) => {
                let locations: Vec<Location> =
                    targets.into_iter().filter_map(target_to_location).collect();
                if locations.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(GotoDefinitionResponse::Array(locations)))
                }
            }
            Err(err @ LspError::UnresolvedTag { .. }) => {
                self.client
                    .log_message(MessageType::WARNING, err.to_string())
                    .await;
                let mut error = Error::internal_error();
                error.message = err.to_string().into();
                Err(error)
            }
            Err(err) => {
                log::warn!(target: "marko_ls::definition", "Definition lookup failed: {}", err);
                Ok(None)
            }
        }
    }
}
