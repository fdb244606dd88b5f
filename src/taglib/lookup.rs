use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::descriptor::{AttributeDescriptor, TagDefinition, TagDescriptor};

/// Tag name whose attributes apply to every tag.
const GLOBAL_TAG: &str = "*";

/// The tags visible from one project root.
#[derive(Debug, Clone, Default)]
pub struct TaglibLookup {
    root: PathBuf,
    tags: BTreeMap<String, TagDefinition>,
    marko_major_version: Option<u64>,
}

impl TaglibLookup {
    pub fn new(
        root: PathBuf,
        tags: BTreeMap<String, TagDefinition>,
        marko_major_version: Option<u64>,
    ) -> Self {
        Self {
            root,
            tags,
            marko_major_version,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn marko_major_version(&self) -> Option<u64> {
        self.marko_major_version
    }

    pub fn tag(&self, name: &str) -> Option<&TagDescriptor> {
        self.tags.get(name).map(|tag| &tag.descriptor)
    }

    /// Attribute declared on `tag_name`, falling back to the global `*` tag.
    pub fn attribute(&self, tag_name: &str, attribute_name: &str) -> Option<&AttributeDescriptor> {
        [tag_name, GLOBAL_TAG]
            .iter()
            .filter_map(|name| self.tags.get(*name))
            .find_map(|tag| tag.attributes.get(attribute_name))
    }

    /// Every concrete tag, ordered by name.
    pub fn tags_sorted(&self) -> Vec<&TagDefinition> {
        self.tags
            .values()
            .filter(|tag| tag.name != GLOBAL_TAG)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str, attrs: &[&str]) -> TagDefinition {
        TagDefinition {
            name: name.to_string(),
            attributes: attrs
                .iter()
                .map(|attr| {
                    (
                        attr.to_string(),
                        AttributeDescriptor {
                            declaring_file: Some(PathBuf::from(format!("/p/{name}.json"))),
                        },
                    )
                })
                .collect(),
            ..Default::default()
        }
    }

    fn lookup(tags: Vec<TagDefinition>) -> TaglibLookup {
        TaglibLookup::new(
            PathBuf::from("/p"),
            tags.into_iter().map(|t| (t.name.clone(), t)).collect(),
            Some(5),
        )
    }

    #[test]
    fn attribute_prefers_the_tag_over_global() {
        let lookup = lookup(vec![tag("*", &["class", "id"]), tag("card", &["id"])]);

        assert_eq!(
            lookup.attribute("card", "id").unwrap().declaring_file,
            Some(PathBuf::from("/p/card.json"))
        );
        assert_eq!(
            lookup.attribute("card", "class").unwrap().declaring_file,
            Some(PathBuf::from("/p/*.json"))
        );
        assert!(lookup.attribute("card", "missing").is_none());
        assert!(lookup.attribute("unknown", "class").is_some());
    }

    #[test]
    fn tags_sorted_skips_global_tag() {
        let lookup = lookup(vec![tag("zeta", &[]), tag("*", &[]), tag("alpha", &[])]);
        let names: Vec<_> = lookup.tags_sorted().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(lookup.marko_major_version(), Some(5));
        assert_eq!(lookup.root(), Path::new("/p"));
    }
}
