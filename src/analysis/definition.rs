//! Go-to-definition resolution for tags, attribute names and event handlers.

use std::path::Path;

use regex::Regex;
use tower_lsp_server::ls_types::Range;
use url::Url;

use super::scope::{Scope, ScopeKind, resolve_scope};
use crate::config::WorkspaceSettings;
use crate::error::{LspError, LspResult};
use crate::taglib::TaglibRegistry;
use crate::text::PositionMapper;

/// A file plus the range to reveal in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionTarget {
    pub uri: Url,
    pub range: Range,
}

impl DefinitionTarget {
    /// Target at the start of `path`. `None` when the path cannot be a file URL.
    fn file_start(path: &Path) -> Option<Self> {
        Self::with_range(path, Range::default())
    }

    fn with_range(path: &Path, range: Range) -> Option<Self> {
        match Url::from_file_path(path) {
            Ok(uri) => Some(Self { uri, range }),
            Err(()) => {
                log::debug!(
                    target: "marko_ls::definition",
                    "Cannot express {} as a file URL",
                    path.display()
                );
                None
            }
        }
    }
}

/// Resolve the definition targets for the cursor at `offset` in `text`.
///
/// An empty list means there is nothing to jump to. The only error is
/// [`LspError::UnresolvedTag`].
pub async fn resolve_definition<R>(
    registry: &R,
    document_path: &Path,
    text: &str,
    offset: usize,
    settings: &WorkspaceSettings,
) -> LspResult<Vec<DefinitionTarget>>
where
    R: TaglibRegistry + ?Sized,
{
    let Some(scope) = resolve_scope(offset, text) else {
        return Ok(Vec::new());
    };
    let document_dir = document_path.parent().unwrap_or(Path::new(""));

    log::debug!(
        target: "marko_ls::definition",
        "Scope at {}:{} is {:?}",
        document_path.display(),
        offset,
        scope
    );

    match scope.kind {
        ScopeKind::Tag => resolve_tag_definition(registry, document_dir, &scope).await,
        ScopeKind::AttributeName => {
            Ok(resolve_attribute_name_definition(registry, document_dir, &scope)
                .await
                .into_iter()
                .collect())
        }
        ScopeKind::AttributeValue => Ok(resolve_attribute_value_definition(
            document_dir,
            &scope,
            &settings.component_files,
        )
        .await
        .into_iter()
        .collect()),
        ScopeKind::NoScope => Ok(Vec::new()),
    }
}

/// Template (or renderer) of the tag, followed by its taglib descriptor when present.
pub async fn resolve_tag_definition<R>(
    registry: &R,
    document_dir: &Path,
    scope: &Scope,
) -> LspResult<Vec<DefinitionTarget>>
where
    R: TaglibRegistry + ?Sized,
{
    let descriptor = registry
        .lookup_tag(document_dir, &scope.tag_name)
        .unwrap_or_default();
    let implementation = descriptor
        .template_path
        .as_deref()
        .or(descriptor.renderer_path.as_deref())
        .ok_or_else(|| LspError::unresolved_tag(&scope.tag_name))?;

    let mut targets: Vec<DefinitionTarget> =
        DefinitionTarget::file_start(implementation).into_iter().collect();

    if let Some(taglib_path) = descriptor.taglib_path.as_deref()
        && is_file(taglib_path).await
    {
        targets.extend(DefinitionTarget::file_start(taglib_path));
    }

    Ok(targets)
}

/// The attribute's declaration key (`"name"` or `"@name"`) in its declaring file.
pub async fn resolve_attribute_name_definition<R>(
    registry: &R,
    document_dir: &Path,
    scope: &Scope,
) -> Option<DefinitionTarget>
where
    R: TaglibRegistry + ?Sized,
{
    let attribute_name = scope.data.as_deref()?;
    let declaring_file = registry
        .lookup_attribute(document_dir, &scope.tag_name, attribute_name)?
        .declaring_file?;

    let pattern = format!("\"@?{}\"", regex::escape(attribute_name));
    locate_in_file(&declaring_file, &pattern, 0).await
}

/// The handler's definition in the first component logic file next to the document.
pub async fn resolve_attribute_value_definition(
    document_dir: &Path,
    scope: &Scope,
    component_files: &[String],
) -> Option<DefinitionTarget> {
    let handler = scope.data.as_deref()?;

    let mut logic_file = None;
    for file_name in component_files {
        let candidate = document_dir.join(file_name);
        if is_file(&candidate).await {
            logic_file = Some(candidate);
            break;
        }
    }
    let logic_file = logic_file?;

    // Group 1 is the handler name through its `(` or `:`.
    let pattern = format!(
        r"(?:^|[^A-Za-z0-9_$])({}\s*[(:])",
        regex::escape(handler)
    );
    locate_in_file(&logic_file, &pattern, 1).await
}

/// Target for the first match of `pattern` in `path`, or the file start when
/// nothing matches. `None` when the file cannot be read.
async fn locate_in_file(path: &Path, pattern: &str, group: usize) -> Option<DefinitionTarget> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) => {
            log::debug!(
                target: "marko_ls::definition",
                "Failed to read {}: {}",
                path.display(),
                err
            );
            return None;
        }
    };

    let regex = match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => {
            log::warn!(
                target: "marko_ls::definition",
                "Invalid search pattern {}: {}",
                pattern,
                err
            );
            return DefinitionTarget::file_start(path);
        }
    };

    let range = regex
        .captures(&contents)
        .and_then(|captures| captures.get(group))
        .and_then(|found| {
            PositionMapper::new(&contents).byte_range_to_range(found.start(), found.end())
        })
        .unwrap_or_default();

    DefinitionTarget::with_range(path, range)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_file())
}
