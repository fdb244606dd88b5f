//! Discovery of the tags available to a project.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::descriptor::{TagDefinition, TagDescriptor, Taglib, parse_marko_tag, parse_taglib};
use super::lookup::TaglibLookup;
use crate::config::WorkspaceSettings;
use crate::error::{LspError, LspResult};

pub const TAGLIB_FILE: &str = "marko.json";
pub const MARKO_TAG_FILE: &str = "marko-tag.json";
pub const PACKAGE_JSON: &str = "package.json";

const TEMPLATE_FILES: &[&str] = &["index.marko", "template.marko"];
const RENDERER_FILES: &[&str] = &["renderer.js"];

/// Knobs for tag discovery, derived from workspace settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    pub tags_dirs: Vec<String>,
    pub installed_taglibs: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        DiscoveryOptions::from(&WorkspaceSettings::default())
    }
}

impl From<&WorkspaceSettings> for DiscoveryOptions {
    fn from(settings: &WorkspaceSettings) -> Self {
        Self {
            tags_dirs: settings.tags_dirs.clone(),
            installed_taglibs: settings.installed_taglibs,
        }
    }
}

/// Nearest ancestor of `dir` (inclusive) containing a `package.json`.
///
/// Falls back to `dir` itself when no package root exists.
pub fn find_project_root(dir: &Path) -> PathBuf {
    dir.ancestors()
        .find(|candidate| candidate.join(PACKAGE_JSON).is_file())
        .unwrap_or(dir)
        .to_path_buf()
}

/// Builds a [`TaglibLookup`] for one project root.
///
/// Layers, later ones overriding earlier ones for the same tag name:
/// installed taglibs, configured tag directories, the root `marko.json`
/// (its `tags-dir` entries first, then its explicit tags).
pub struct TaglibLoader<'a> {
    options: &'a DiscoveryOptions,
}

impl<'a> TaglibLoader<'a> {
    pub fn new(options: &'a DiscoveryOptions) -> Self {
        Self { options }
    }

    pub fn load(&self, project_root: &Path) -> TaglibLookup {
        let mut tags = BTreeMap::new();

        if self.options.installed_taglibs {
            for taglib_path in installed_taglib_paths(project_root) {
                if let Some(taglib) = read_taglib(&taglib_path) {
                    merge_taglib(&mut tags, taglib);
                }
            }
        }

        let root_taglib_path = project_root.join(TAGLIB_FILE);
        let root_taglib = root_taglib_path
            .is_file()
            .then(|| read_taglib(&root_taglib_path))
            .flatten();
        let owning_taglib = root_taglib.as_ref().map(|taglib| taglib.path.as_path());

        for dir in &self.options.tags_dirs {
            scan_tags_dir(&project_root.join(dir), owning_taglib, &mut tags);
        }
        if let Some(taglib) = root_taglib {
            merge_taglib(&mut tags, taglib);
        }

        let marko_version = detect_marko_major_version(project_root);
        log::debug!(
            target: "marko_ls::taglib",
            "Loaded {} tags for {} (marko major version: {:?})",
            tags.len(),
            project_root.display(),
            marko_version
        );

        TaglibLookup::new(project_root.to_path_buf(), tags, marko_version)
    }
}

fn read_taglib(path: &Path) -> Option<Taglib> {
    match fs::read_to_string(path)
        .map_err(LspError::from)
        .and_then(|contents| parse_taglib(path, &contents))
    {
        Ok(taglib) => Some(taglib),
        Err(err) => {
            log::warn!(target: "marko_ls::taglib", "Skipping taglib: {}", err);
            None
        }
    }
}

fn merge_taglib(tags: &mut BTreeMap<String, TagDefinition>, taglib: Taglib) {
    for dir in &taglib.tags_dirs {
        scan_tags_dir(dir, Some(&taglib.path), tags);
    }
    for tag in taglib.tags {
        tags.insert(tag.name.clone(), tag);
    }
}

/// Register every tag found directly inside `dir`.
///
/// `<name>.marko` files and `<name>/` directories holding a template,
/// renderer or `marko-tag.json` are tags.
fn scan_tags_dir(
    dir: &Path,
    owning_taglib: Option<&Path>,
    tags: &mut BTreeMap<String, TagDefinition>,
) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut paths: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
    paths.sort();

    for path in paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }

        let definition = if path.is_dir() {
            tag_from_directory(&path, name, owning_taglib)
        } else {
            name.strip_suffix(".marko").map(|tag_name| TagDefinition {
                name: tag_name.to_string(),
                descriptor: TagDescriptor {
                    template_path: Some(path.clone()),
                    renderer_path: None,
                    taglib_path: owning_taglib.map(Path::to_path_buf),
                },
                ..Default::default()
            })
        };

        if let Some(definition) = definition {
            tags.insert(definition.name.clone(), definition);
        }
    }
}

fn tag_from_directory(
    dir: &Path,
    name: &str,
    owning_taglib: Option<&Path>,
) -> Option<TagDefinition> {
    let marko_tag_path = dir.join(MARKO_TAG_FILE);
    let mut definition = if marko_tag_path.is_file() {
        match read_marko_tag(name, &marko_tag_path) {
            Ok(definition) => definition,
            Err(err) => {
                log::warn!(target: "marko_ls::taglib", "Skipping tag <{}>: {}", name, err);
                return None;
            }
        }
    } else {
        TagDefinition {
            name: name.to_string(),
            descriptor: TagDescriptor {
                taglib_path: owning_taglib.map(Path::to_path_buf),
                ..Default::default()
            },
            ..Default::default()
        }
    };

    let first_existing = |candidates: &[&str]| {
        candidates
            .iter()
            .map(|file| dir.join(file))
            .find(|path| path.is_file())
    };
    if definition.descriptor.template_path.is_none() {
        definition.descriptor.template_path = first_existing(TEMPLATE_FILES);
    }
    if definition.descriptor.renderer_path.is_none() {
        definition.descriptor.renderer_path = first_existing(RENDERER_FILES);
    }

    let has_descriptor = marko_tag_path.is_file();
    (has_descriptor || definition.is_resolvable()).then_some(definition)
}

fn read_marko_tag(name: &str, path: &Path) -> LspResult<TagDefinition> {
    let contents = fs::read_to_string(path)?;
    parse_marko_tag(name, path, &contents)
}

fn read_package_json(dir: &Path) -> Option<serde_json::Map<String, Value>> {
    let contents = fs::read_to_string(dir.join(PACKAGE_JSON)).ok()?;
    match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// `node_modules/<dep>/marko.json` for each dependency that ships one.
fn installed_taglib_paths(project_root: &Path) -> Vec<PathBuf> {
    let Some(package) = read_package_json(project_root) else {
        return Vec::new();
    };

    let mut names: Vec<&String> = ["dependencies", "devDependencies", "peerDependencies"]
        .iter()
        .filter_map(|section| package.get(*section).and_then(Value::as_object))
        .flat_map(|deps| deps.keys())
        .collect();
    names.sort();
    names.dedup();

    names
        .into_iter()
        .map(|name| project_root.join("node_modules").join(name).join(TAGLIB_FILE))
        .filter(|path| path.is_file())
        .collect()
}

/// Major version of the project's installed `marko` package.
pub fn detect_marko_major_version(project_root: &Path) -> Option<u64> {
    let package = read_package_json(&project_root.join("node_modules").join("marko"))?;
    let version = package.get("version")?.as_str()?;
    let major: String = version.chars().take_while(char::is_ascii_digit).collect();
    major.parse().ok()
}
