//! Tag completion through the `LanguageServer` handlers.

mod helpers;

use helpers::service::marko_service;
use helpers::test_fixtures::MarkoProject;
use std::str::FromStr;
use tower_lsp_server::LanguageServer;
use tower_lsp_server::ls_types::*;

fn completion_params(project: &MarkoProject) -> CompletionParams {
    CompletionParams {
        text_document_position: TextDocumentPositionParams {
            text_document: TextDocumentIdentifier {
                uri: Uri::from_str(project.url("pages/home/template.marko").as_str())
                    .expect("fixture url should be a valid uri"),
            },
            position: Position::new(0, 0),
        },
        work_done_progress_params: WorkDoneProgressParams::default(),
        partial_result_params: PartialResultParams::default(),
        context: None,
    }
}

fn items(response: Option<CompletionResponse>) -> Vec<CompletionItem> {
    match response {
        Some(CompletionResponse::List(list)) => {
            assert!(!list.is_incomplete);
            list.items
        }
        Some(CompletionResponse::Array(items)) => items,
        None => Vec::new(),
    }
}

#[tokio::test]
async fn completion_lists_project_tags_sorted() {
    let project = MarkoProject::new();
    let service = marko_service();
    let server = service.inner();

    let items = items(
        server
            .completion(completion_params(&project))
            .await
            .expect("completion should succeed"),
    );

    let labels: Vec<&str> = items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, vec!["app-button", "app-header", "ghost-tag"]);
    assert!(
        items
            .iter()
            .all(|item| item.kind == Some(CompletionItemKind::SNIPPET))
    );
}

#[tokio::test]
async fn resolve_renders_usage_documentation() {
    let project = MarkoProject::new();
    let service = marko_service();
    let server = service.inner();

    let items = items(
        server
            .completion(completion_params(&project))
            .await
            .expect("completion should succeed"),
    );
    let button = items
        .into_iter()
        .find(|item| item.label == "app-button")
        .expect("app-button should be offered");

    let resolved = server
        .completion_resolve(button)
        .await
        .expect("resolve should succeed");

    match resolved.documentation {
        Some(Documentation::MarkupContent(content)) => {
            assert_eq!(content.kind, MarkupKind::Markdown);
            assert_eq!(
                content.value,
                "Usage: app-button label=\"${1}\"\nRead more at [link](https://markojs.com/docs/custom-tags/)"
            );
        }
        other => panic!("unexpected documentation: {other:?}"),
    }
}

#[tokio::test]
async fn resolve_leaves_items_without_examples_alone() {
    let project = MarkoProject::new();
    let service = marko_service();
    let server = service.inner();

    let items = items(
        server
            .completion(completion_params(&project))
            .await
            .expect("completion should succeed"),
    );
    let header = items
        .into_iter()
        .find(|item| item.label == "app-header")
        .expect("app-header should be offered");

    let resolved = server
        .completion_resolve(header.clone())
        .await
        .expect("resolve should succeed");
    assert_eq!(resolved, header);
}
