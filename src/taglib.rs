//! Template-library registry: which tags exist and where they are implemented.

pub mod cache;
pub mod descriptor;
pub mod loader;
pub mod lookup;

use std::path::Path;

use serde::Serialize;

pub use cache::TaglibCache;
pub use descriptor::{AttributeDescriptor, Autocomplete, TagDefinition, TagDescriptor, Taglib};
pub use loader::{DiscoveryOptions, TaglibLoader, detect_marko_major_version, find_project_root};
pub use lookup::TaglibLookup;

/// A tag as offered to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagInfo {
    pub name: String,
    pub autocomplete: Vec<Autocomplete>,
}

impl From<&TagDefinition> for TagInfo {
    fn from(tag: &TagDefinition) -> Self {
        Self {
            name: tag.name.clone(),
            autocomplete: tag.autocomplete.clone(),
        }
    }
}

/// Tag metadata keyed by the directory of the document being edited.
///
/// Implementations map `dir` to its project root themselves.
pub trait TaglibRegistry: Send + Sync {
    fn lookup_tag(&self, dir: &Path, tag_name: &str) -> Option<TagDescriptor>;

    fn lookup_attribute(
        &self,
        dir: &Path,
        tag_name: &str,
        attribute_name: &str,
    ) -> Option<AttributeDescriptor>;

    /// Tags known to the project, unique by name and sorted.
    fn tags_sorted(&self, dir: &Path) -> Vec<TagInfo>;
}

impl TaglibRegistry for TaglibCache {
    fn lookup_tag(&self, dir: &Path, tag_name: &str) -> Option<TagDescriptor> {
        self.lookup(dir).tag(tag_name).cloned()
    }

    fn lookup_attribute(
        &self,
        dir: &Path,
        tag_name: &str,
        attribute_name: &str,
    ) -> Option<AttributeDescriptor> {
        self.lookup(dir).attribute(tag_name, attribute_name).cloned()
    }

    fn tags_sorted(&self, dir: &Path) -> Vec<TagInfo> {
        self.lookup(dir)
            .tags_sorted()
            .into_iter()
            .map(TagInfo::from)
            .collect()
    }
}
