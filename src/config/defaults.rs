//! Default configuration values for marko-ls.

use super::settings::MarkoSettings;

/// Component-logic files checked next to a template, in priority order.
pub const DEFAULT_COMPONENT_FILES: &[&str] = &["component.js", "widget.js", "index.js"];

/// Tag directories scanned under the project root.
pub const DEFAULT_TAGS_DIRS: &[&str] = &["components"];

/// Returns the programmed defaults, the lowest settings layer.
pub fn default_settings() -> MarkoSettings {
    MarkoSettings {
        component_files: Some(to_strings(DEFAULT_COMPONENT_FILES)),
        tags_dirs: Some(to_strings(DEFAULT_TAGS_DIRS)),
        installed_taglibs: Some(true),
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
