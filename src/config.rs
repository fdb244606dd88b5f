pub mod defaults;
pub mod settings;
pub mod user;

pub use settings::{MarkoSettings, WorkspaceSettings};
pub use user::{load_user_config, user_config_path};

/// Merge settings layers from lowest to highest precedence.
pub fn merge_all(configs: &[Option<MarkoSettings>]) -> Option<MarkoSettings> {
    configs.iter().cloned().reduce(merge_settings).flatten()
}

/// Merge two MarkoSettings, preferring values from `primary` over `fallback`
pub fn merge_settings(
    fallback: Option<MarkoSettings>,
    primary: Option<MarkoSettings>,
) -> Option<MarkoSettings> {
    match (fallback, primary) {
        (None, None) => None,
        (Some(settings), None) => Some(settings),
        (None, Some(settings)) => Some(settings),
        (Some(fallback), Some(primary)) => Some(MarkoSettings {
            component_files: primary.component_files.or(fallback.component_files),
            tags_dirs: primary.tags_dirs.or(fallback.tags_dirs),
            installed_taglibs: primary.installed_taglibs.or(fallback.installed_taglibs),
        }),
    }
}
