mod lsp_impl;
mod settings;

pub use lsp_impl::{MarkoLs, TRIGGER_CHARACTERS};
pub use settings::{
    PROJECT_CONFIG_FILE, SettingsEvent, SettingsEventKind, SettingsLoadOutcome, SettingsSource,
    load_settings,
};
