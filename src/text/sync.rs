//! Applying `textDocument/didChange` content changes to stored text.

use tower_lsp_server::ls_types::TextDocumentContentChangeEvent;

use super::PositionMapper;

/// Apply content changes in order and return the resulting text.
///
/// Ranged changes replace the addressed slice of the running text; a change
/// without a range replaces the whole document.
pub fn apply_content_changes(
    old_text: &str,
    content_changes: Vec<TextDocumentContentChangeEvent>,
) -> String {
    let mut text = old_text.to_string();

    for change in content_changes {
        match change.range {
            Some(range) => {
                let mapper = PositionMapper::new(&text);
                let start_offset = mapper.position_to_byte(range.start).unwrap_or(text.len());
                let end_offset = mapper
                    .position_to_byte(range.end)
                    .unwrap_or(text.len())
                    .max(start_offset);
                text.replace_range(start_offset..end_offset, &change.text);
            }
            None => text = change.text,
        }
    }

    text
}
