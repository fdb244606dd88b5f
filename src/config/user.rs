//! User configuration loading for marko-ls.
//!
//! User config location: `<config dir>/marko-ls/marko-ls.toml`, where the
//! config dir is `$XDG_CONFIG_HOME` (or `~/.config`) on Linux.

use std::path::PathBuf;

use super::settings::MarkoSettings;
use crate::error::{LspError, LspResult};

/// Returns the path to the user configuration file.
///
/// Returns None if the config directory cannot be determined.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("marko-ls").join("marko-ls.toml"))
}

/// Load the user configuration file.
///
/// A missing file is `Ok(None)`; an unreadable or invalid file is an error.
pub fn load_user_config() -> LspResult<Option<MarkoSettings>> {
    let Some(path) = user_config_path() else {
        return Ok(None);
    };
    if !path.is_file() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)?;
    parse_settings_toml(&contents).map(Some)
}

pub(crate) fn parse_settings_toml(contents: &str) -> LspResult<MarkoSettings> {
    toml::from_str::<MarkoSettings>(contents).map_err(|err| LspError::config(err.to_string()))
}
