use crate::config::{
    MarkoSettings, WorkspaceSettings, defaults::default_settings, load_user_config, merge_all,
};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Project-level configuration file, looked up in the workspace root.
pub const PROJECT_CONFIG_FILE: &str = "marko-ls.toml";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsEventKind {
    Info,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsEvent {
    pub kind: SettingsEventKind,
    pub message: String,
}

impl SettingsEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Warning,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsSource {
    InitializationOptions,
    ClientConfiguration,
}

impl SettingsSource {
    fn description(self) -> &'static str {
        match self {
            SettingsSource::InitializationOptions => "initialization options",
            SettingsSource::ClientConfiguration => "client configuration",
        }
    }
}

#[derive(Default, Debug)]
pub struct SettingsLoadOutcome {
    pub settings: Option<WorkspaceSettings>,
    pub events: Vec<SettingsEvent>,
}

/// Merge defaults < user config < project `marko-ls.toml` < client layers.
///
/// Client layers apply in slice order, so later entries win.
pub fn load_settings(
    root_path: Option<&Path>,
    client_layers: &[(SettingsSource, Value)],
) -> SettingsLoadOutcome {
    let mut events = Vec::new();

    let mut layers = vec![
        Some(default_settings()),
        load_user_config_with_events(&mut events),
        load_toml_settings(root_path, &mut events),
    ];
    for (source, value) in client_layers {
        layers.push(parse_override_settings(*source, value.clone(), &mut events));
    }

    let settings = merge_all(&layers).map(WorkspaceSettings::from);

    SettingsLoadOutcome { settings, events }
}

fn load_user_config_with_events(events: &mut Vec<SettingsEvent>) -> Option<MarkoSettings> {
    match load_user_config() {
        Ok(Some(settings)) => {
            events.push(SettingsEvent::info("Loaded user config"));
            Some(settings)
        }
        Ok(None) => None,
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to load user config: {}",
                err
            )));
            None
        }
    }
}

fn load_toml_settings(
    root_path: Option<&Path>,
    events: &mut Vec<SettingsEvent>,
) -> Option<MarkoSettings> {
    let root = root_path?;
    let config_path = root.join(PROJECT_CONFIG_FILE);
    if !config_path.exists() {
        return None;
    }

    events.push(SettingsEvent::info(format!(
        "Found config file: {}",
        config_path.display()
    )));

    match fs::read_to_string(&config_path) {
        Ok(contents) => match toml::from_str::<MarkoSettings>(&contents) {
            Ok(settings) => {
                events.push(SettingsEvent::info(format!(
                    "Successfully loaded {}",
                    PROJECT_CONFIG_FILE
                )));
                Some(settings)
            }
            Err(err) => {
                events.push(SettingsEvent::warning(format!(
                    "Failed to parse {}: {}",
                    PROJECT_CONFIG_FILE, err
                )));
                None
            }
        },
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to read {}: {}",
                PROJECT_CONFIG_FILE, err
            )));
            None
        }
    }
}

fn parse_override_settings(
    source: SettingsSource,
    value: Value,
    events: &mut Vec<SettingsEvent>,
) -> Option<MarkoSettings> {
    // Clients commonly nest server settings under a `marko` section.
    let value = match value {
        Value::Object(mut map) if map.contains_key("marko") => {
            map.remove("marko").unwrap_or(Value::Null)
        }
        other => other,
    };
    if value.is_null() {
        return None;
    }

    match serde_json::from_value::<MarkoSettings>(value) {
        Ok(settings) => {
            events.push(SettingsEvent::info(format!(
                "Parsed {} as marko-ls settings",
                source.description()
            )));
            Some(settings)
        }
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to parse {}: {}",
                source.description(),
                err
            )));
            None
        }
    }
}
