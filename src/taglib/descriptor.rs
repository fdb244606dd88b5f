//! Taglib descriptor files: `marko.json` and `marko-tag.json`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LspError, LspResult};

/// Example usage shown when a tag completion is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Autocomplete {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(
        rename = "descriptionMoreURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description_more_url: Option<String>,
}

/// Where a tag is implemented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDescriptor {
    pub template_path: Option<PathBuf>,
    pub renderer_path: Option<PathBuf>,
    /// The taglib descriptor file that declares the tag
    pub taglib_path: Option<PathBuf>,
}

/// Where an attribute is declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeDescriptor {
    pub declaring_file: Option<PathBuf>,
}

/// Everything the registry knows about one tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDefinition {
    pub name: String,
    pub descriptor: TagDescriptor,
    pub attributes: BTreeMap<String, AttributeDescriptor>,
    pub autocomplete: Vec<Autocomplete>,
}

impl TagDefinition {
    pub fn is_resolvable(&self) -> bool {
        self.descriptor.template_path.is_some() || self.descriptor.renderer_path.is_some()
    }
}

/// A parsed `marko.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taglib {
    pub path: PathBuf,
    pub tags: Vec<TagDefinition>,
    /// Extra directories to scan for tags, already resolved
    pub tags_dirs: Vec<PathBuf>,
}

/// Parse a `marko.json` taglib.
///
/// Keys written as `<tag-name>` declare tags; `tags-dir` adds scanned
/// directories. Other keys are ignored.
pub fn parse_taglib(path: &Path, contents: &str) -> LspResult<Taglib> {
    let root = parse_object(path, contents)?;
    let mut taglib = Taglib {
        path: path.to_path_buf(),
        ..Default::default()
    };

    for (key, value) in &root {
        if key == "tags-dir" {
            taglib.tags_dirs = string_or_list(value)
                .iter()
                .map(|dir| resolve_relative(path, dir))
                .collect();
        } else if let Some(tag_name) = tag_key(key) {
            let definition = parse_tag_definition(tag_name, value, path)?;
            taglib.tags.push(definition);
        }
    }

    Ok(taglib)
}

/// Parse a `marko-tag.json` describing the tag named after its directory.
pub fn parse_marko_tag(tag_name: &str, path: &Path, contents: &str) -> LspResult<TagDefinition> {
    let root = parse_object(path, contents)?;
    parse_tag_definition(tag_name, &Value::Object(root), path)
}

fn parse_object(path: &Path, contents: &str) -> LspResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(contents) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(LspError::taglib(path, "expected a JSON object")),
        Err(err) => Err(LspError::taglib(path, err.to_string())),
    }
}

fn parse_tag_definition(
    tag_name: &str,
    value: &Value,
    declaring_file: &Path,
) -> LspResult<TagDefinition> {
    let Value::Object(map) = value else {
        return Err(LspError::taglib(
            declaring_file,
            format!("definition of <{}> must be an object", tag_name),
        ));
    };

    let path_field = |field: &str| {
        map.get(field)
            .and_then(Value::as_str)
            .map(|relative| resolve_relative(declaring_file, relative))
    };

    let declared_here = AttributeDescriptor {
        declaring_file: Some(declaring_file.to_path_buf()),
    };
    let mut attributes = BTreeMap::new();
    for key in map.keys() {
        if let Some(attr) = key.strip_prefix('@') {
            attributes.insert(attr.to_string(), declared_here.clone());
        }
    }
    if let Some(Value::Object(declared)) = map.get("attributes") {
        for key in declared.keys() {
            let attr = key.strip_prefix('@').unwrap_or(key);
            attributes.insert(attr.to_string(), declared_here.clone());
        }
    }

    let autocomplete = match map.get("autocomplete") {
        Some(value) => serde_json::from_value::<Vec<Autocomplete>>(value.clone()).map_err(|err| {
            LspError::taglib(
                declaring_file,
                format!("autocomplete of <{}>: {}", tag_name, err),
            )
        })?,
        None => Vec::new(),
    };

    Ok(TagDefinition {
        name: tag_name.to_string(),
        descriptor: TagDescriptor {
            template_path: path_field("template"),
            renderer_path: path_field("renderer"),
            taglib_path: Some(declaring_file.to_path_buf()),
        },
        attributes,
        autocomplete,
    })
}

/// `"<my-tag>"` declares `my-tag`; the `*` key declares attributes shared by all tags.
fn tag_key(key: &str) -> Option<&str> {
    if key == "*" || key == "<*>" {
        return Some("*");
    }
    key.strip_prefix('<')?.strip_suffix('>')
}

fn string_or_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(single) => vec![single.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Resolve `relative` against the directory containing `declaring_file`.
pub(crate) fn resolve_relative(declaring_file: &Path, relative: &str) -> PathBuf {
    let base = declaring_file.parent().unwrap_or(Path::new(""));
    base.join(relative).clean()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tags_attributes_and_autocomplete() {
        let path = Path::new("/project/marko.json");
        let contents = r#"{
            "tags-dir": "./ui",
            "<my-button>": {
                "template": "./components/my-button/index.marko",
                "@label": "string",
                "attributes": { "size": "string" },
                "autocomplete": [
                    { "snippet": "my-button label=\"${1}\"", "descriptionMoreURL": "https://example.com" }
                ]
            },
            "<fancy>": { "renderer": "./renderers/fancy.js" },
            "taglib-id": "ignored"
        }"#;

        let taglib = parse_taglib(path, contents).unwrap();
        assert_eq!(taglib.tags_dirs, vec![PathBuf::from("/project/ui")]);
        assert_eq!(taglib.tags.len(), 2);

        let button = taglib.tags.iter().find(|t| t.name == "my-button").unwrap();
        assert_eq!(
            button.descriptor.template_path,
            Some(PathBuf::from("/project/components/my-button/index.marko"))
        );
        assert_eq!(button.descriptor.taglib_path, Some(path.to_path_buf()));
        assert!(button.attributes.contains_key("label"));
        assert!(button.attributes.contains_key("size"));
        assert_eq!(
            button.attributes["label"].declaring_file,
            Some(path.to_path_buf())
        );
        assert_eq!(button.autocomplete.len(), 1);
        assert_eq!(
            button.autocomplete[0].description_more_url.as_deref(),
            Some("https://example.com")
        );

        let fancy = taglib.tags.iter().find(|t| t.name == "fancy").unwrap();
        assert_eq!(
            fancy.descriptor.renderer_path,
            Some(PathBuf::from("/project/renderers/fancy.js"))
        );
        assert!(fancy.is_resolvable());
    }

    #[test]
    fn tag_without_template_or_renderer_is_not_resolvable() {
        let taglib = parse_taglib(
            Path::new("/p/marko.json"),
            r#"{ "<ghost>": { "@visible": "boolean" } }"#,
        )
        .unwrap();
        assert!(!taglib.tags[0].is_resolvable());
    }

    #[test]
    fn marko_tag_json_uses_directory_name() {
        let path = Path::new("/p/components/card/marko-tag.json");
        let tag = parse_marko_tag("card", path, r#"{ "@title": "string" }"#).unwrap();
        assert_eq!(tag.name, "card");
        assert_eq!(
            tag.attributes["title"].declaring_file,
            Some(path.to_path_buf())
        );
    }

    #[test]
    fn non_object_root_is_rejected() {
        let err = parse_taglib(Path::new("/p/marko.json"), "[1, 2]").unwrap_err();
        assert!(matches!(err, LspError::Taglib { .. }));
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(parse_taglib(Path::new("/p/marko.json"), "{ nope").is_err());
    }

    #[test]
    fn resolves_parent_segments() {
        assert_eq!(
            resolve_relative(Path::new("/p/lib/marko.json"), "../shared/x.marko"),
            PathBuf::from("/p/shared/x.marko")
        );
    }
}
