use serde::{Deserialize, Serialize};

/// Settings as written by the user (TOML file or client JSON).
///
/// Every field is optional so that layers can be merged; unset fields fall
/// through to the next layer down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkoSettings {
    /// Sibling component-logic files searched for event handlers, in priority order
    pub component_files: Option<Vec<String>>,
    /// Directories under the project root scanned for custom tags
    pub tags_dirs: Option<Vec<String>>,
    /// Also load taglibs shipped by packages listed in `package.json`
    pub installed_taglibs: Option<bool>,
}

/// Fully resolved settings used by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSettings {
    pub component_files: Vec<String>,
    pub tags_dirs: Vec<String>,
    pub installed_taglibs: bool,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        WorkspaceSettings::from(super::defaults::default_settings())
    }
}

impl From<MarkoSettings> for WorkspaceSettings {
    fn from(settings: MarkoSettings) -> Self {
        let defaults = super::defaults::default_settings();
        Self {
            component_files: settings
                .component_files
                .or(defaults.component_files)
                .unwrap_or_default(),
            tags_dirs: settings.tags_dirs.or(defaults.tags_dirs).unwrap_or_default(),
            installed_taglibs: settings
                .installed_taglibs
                .or(defaults.installed_taglibs)
                .unwrap_or(false),
        }
    }
}
