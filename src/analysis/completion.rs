//! Tag completion and lazy usage documentation.

use tower_lsp_server::ls_types::{
    CompletionItem, CompletionItemKind, CompletionList, Documentation, MarkupContent, MarkupKind,
};

use crate::taglib::{Autocomplete, TagInfo};

/// One snippet item per tag. Usage examples ride along in `data` for
/// [`resolve_completion_item`].
pub fn completion_items(tags: Vec<TagInfo>) -> CompletionList {
    let items = tags
        .into_iter()
        .map(|tag| CompletionItem {
            label: tag.name,
            kind: Some(CompletionItemKind::SNIPPET),
            data: (!tag.autocomplete.is_empty())
                .then(|| serde_json::to_value(&tag.autocomplete).ok())
                .flatten(),
            ..Default::default()
        })
        .collect();

    CompletionList {
        is_incomplete: false,
        items,
    }
}

/// Expand the usage examples stored in `data` into Markdown documentation.
pub fn resolve_completion_item(mut item: CompletionItem) -> CompletionItem {
    let Some(data) = item.data.clone() else {
        return item;
    };
    let autocomplete: Vec<Autocomplete> = match serde_json::from_value(data) {
        Ok(autocomplete) => autocomplete,
        Err(err) => {
            log::debug!(
                target: "marko_ls::completion",
                "Ignoring completion data of {}: {}",
                item.label,
                err
            );
            return item;
        }
    };

    item.documentation = Some(Documentation::MarkupContent(MarkupContent {
        kind: MarkupKind::Markdown,
        value: usage_documentation(&autocomplete),
    }));
    item
}

fn usage_documentation(autocomplete: &[Autocomplete]) -> String {
    autocomplete
        .iter()
        .map(|entry| match &entry.snippet {
            None => String::new(),
            Some(snippet) => {
                let mut usage = format!("Usage: {snippet}\n");
                if let Some(url) = entry
                    .description_more_url
                    .as_deref()
                    .filter(|url| !url.is_empty())
                {
                    usage.push_str(&format!("Read more at [link]({url})"));
                }
                usage
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str, autocomplete: Vec<Autocomplete>) -> TagInfo {
        TagInfo {
            name: name.to_string(),
            autocomplete,
        }
    }

    fn entry(snippet: Option<&str>, url: Option<&str>) -> Autocomplete {
        Autocomplete {
            snippet: snippet.map(str::to_string),
            description_more_url: url.map(str::to_string),
        }
    }

    fn documentation(item: &CompletionItem) -> &str {
        match item.documentation.as_ref() {
            Some(Documentation::MarkupContent(content)) => &content.value,
            other => panic!("unexpected documentation: {other:?}"),
        }
    }

    #[test]
    fn items_are_snippets_with_autocomplete_data() {
        let list = completion_items(vec![
            tag("app-header", vec![entry(Some("app-header title=\"\""), None)]),
            tag("plain", vec![]),
        ]);

        assert!(!list.is_incomplete);
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].label, "app-header");
        assert_eq!(list.items[0].kind, Some(CompletionItemKind::SNIPPET));
        assert_eq!(
            list.items[0].data,
            Some(serde_json::json!([{ "snippet": "app-header title=\"\"" }]))
        );
        assert_eq!(list.items[1].data, None);
    }

    #[test]
    fn resolve_joins_usage_lines() {
        let list = completion_items(vec![tag(
            "app-header",
            vec![
                entry(Some("<app-header/>"), Some("https://markojs.com/docs")),
                entry(None, Some("https://ignored.example")),
                entry(Some("<app-header title=\"\"/>"), None),
            ],
        )]);

        let item = resolve_completion_item(list.items[0].clone());
        assert_eq!(
            documentation(&item),
            concat!(
                "Usage: <app-header/>\nRead more at [link](https://markojs.com/docs)\n",
                "\n",
                "Usage: <app-header title=\"\"/>\n",
            )
        );
    }

    #[test]
    fn resolve_without_data_is_unchanged() {
        let item = CompletionItem {
            label: "plain".to_string(),
            ..Default::default()
        };
        assert_eq!(resolve_completion_item(item.clone()), item);
    }

    #[test]
    fn resolve_with_foreign_data_is_unchanged() {
        let item = CompletionItem {
            label: "other".to_string(),
            data: Some(serde_json::json!({ "source": "elsewhere" })),
            ..Default::default()
        };
        assert_eq!(resolve_completion_item(item.clone()), item);
    }

    #[test]
    fn resolve_accepts_data_from_the_client() {
        let item = CompletionItem {
            label: "app-footer".to_string(),
            data: Some(serde_json::json!([
                { "snippet": "<app-footer/>", "descriptionMoreURL": "" }
            ])),
            ..Default::default()
        };
        assert_eq!(
            documentation(&resolve_completion_item(item)),
            "Usage: <app-footer/>\n"
        );
    }
}
