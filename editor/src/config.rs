//! Persisted configuration model and the configuration service.
//!
//! DESIGN
//! ======
//! Field names follow the saved JSON files exactly (camelCase, optional
//! fields skipped when absent) so existing exports round-trip. The service
//! validates every replacement before accepting it: a rejected update leaves
//! the stored configuration untouched and returns a human-readable message.
//! An empty message means success. Accepted updates bump a revision published
//! on a `watch` channel.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

// =============================================================================
// PERSISTED MODEL
// =============================================================================

/// Complete editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Base64-encoded images and files.
    pub assets: AssetsConfig,
    /// All available object type names.
    pub map_object_types: Vec<String>,
    /// Object type definitions.
    pub map_objects: Vec<MapObjectConfig>,
    /// One entry per floor.
    pub floor_maps: Vec<MapConfig>,
    pub editor_settings: EditorSettings,
}

/// Asset groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Object images.
    #[serde(default)]
    pub objects: Vec<Asset>,
    #[serde(default)]
    pub icons: Vec<Asset>,
    /// Backgrounds and other files.
    #[serde(default)]
    pub others: Vec<Asset>,
}

/// A named base64 asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// File name with extension.
    pub name: String,
    /// Base64 payload, optionally with a `data:<mime>;base64,` header.
    pub data: String,
}

/// Definition of one object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapObjectConfig {
    /// Object asset drawn on the map.
    pub image: String,
    /// Toolbar icon asset.
    pub icon: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A persisted floor map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    /// Floor number.
    pub id: i64,
    pub icon: String,
    /// Name of the background asset (in the `others` group).
    pub background_image: String,
    /// PNG data URL of the last rendered map.
    pub rendered_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_height: Option<u32>,
    /// Items in draw order.
    #[serde(default)]
    pub items: Vec<MapItem>,
}

/// A persisted placed object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapItem {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    /// Always written as 0; order is array order.
    #[serde(default)]
    pub z: i64,
    /// Degrees.
    pub rotation: f64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

/// Toolbar entry; a header when `kind` is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolbarItemSettings {
    pub caption: String,
    pub icon: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ToolbarItemSettings>>,
}

/// Editor behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    pub snap_to_grid: bool,
    pub show_grid: bool,
    /// Id of the floor shown on start.
    pub current_floor_map: i64,
    #[serde(default)]
    pub toolbar: Vec<ToolbarItemSettings>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self { snap_to_grid: true, show_grid: true, current_floor_map: 0, toolbar: Vec::new() }
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// A single configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("no object types are declared")]
    NoObjectTypes,
    #[error("object type '{0}' is declared more than once")]
    DuplicateObjectType(String),
    #[error("object '{0}' uses an undeclared type")]
    UndeclaredObjectType(String),
    #[error("object '{kind}' references missing image asset '{image}'")]
    MissingObjectImage { kind: String, image: String },
    #[error("floor map {0} is defined more than once")]
    DuplicateFloor(i64),
    #[error("floor map {floor} references missing background '{image}'")]
    MissingBackground { floor: i64, image: String },
    #[error("floor map {floor} contains item of unknown type '{kind}'")]
    UnknownItemType { floor: i64, kind: String },
    #[error("current floor map {0} does not exist")]
    UnknownCurrentFloor(i64),
}

/// Check a full configuration. Returns every problem found.
#[must_use]
pub fn validate(config: &Configuration) -> Vec<ConfigError> {
    let mut errors = validate_objects(config);
    errors.extend(validate_floor_maps(&config.floor_maps, config));
    errors.extend(validate_settings(&config.editor_settings, &config.floor_maps));
    errors
}

fn validate_objects(config: &Configuration) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    if config.map_object_types.is_empty() {
        errors.push(ConfigError::NoObjectTypes);
    }

    let mut seen = HashSet::new();
    for kind in &config.map_object_types {
        if !seen.insert(kind.as_str()) {
            errors.push(ConfigError::DuplicateObjectType(kind.clone()));
        }
    }

    for object in &config.map_objects {
        if !seen.contains(object.kind.as_str()) {
            errors.push(ConfigError::UndeclaredObjectType(object.kind.clone()));
        }
        if !config.assets.objects.iter().any(|a| a.name == object.image) {
            errors.push(ConfigError::MissingObjectImage { kind: object.kind.clone(), image: object.image.clone() });
        }
    }
    errors
}

fn validate_floor_maps(floors: &[MapConfig], config: &Configuration) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();
    for floor in floors {
        if !ids.insert(floor.id) {
            errors.push(ConfigError::DuplicateFloor(floor.id));
        }
        if !config.assets.others.iter().any(|a| a.name == floor.background_image) {
            errors.push(ConfigError::MissingBackground { floor: floor.id, image: floor.background_image.clone() });
        }
        for item in &floor.items {
            if !config.map_object_types.contains(&item.kind) {
                errors.push(ConfigError::UnknownItemType { floor: floor.id, kind: item.kind.clone() });
            }
        }
    }
    errors
}

fn validate_settings(settings: &EditorSettings, floors: &[MapConfig]) -> Vec<ConfigError> {
    if floors.iter().any(|f| f.id == settings.current_floor_map) {
        Vec::new()
    } else {
        vec![ConfigError::UnknownCurrentFloor(settings.current_floor_map)]
    }
}

fn to_message(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// SERVICE
// =============================================================================

/// Owner of the active configuration.
pub struct ConfigService {
    config: Configuration,
    revision: watch::Sender<u64>,
}

impl ConfigService {
    /// Create a service holding an empty (unvalidated) configuration.
    #[must_use]
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self { config: Configuration::default(), revision }
    }

    /// Subscribe to change notifications. The value is the revision number.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Current revision; zero until the first accepted configuration.
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Replace the whole configuration. Returns an empty string on success.
    pub fn set_config(&mut self, config: Configuration) -> String {
        let errors = validate(&config);
        if !errors.is_empty() {
            return to_message(&errors);
        }
        self.config = config;
        self.bump();
        String::new()
    }

    /// Replace the floor maps only.
    pub fn set_floor_maps(&mut self, floor_maps: Vec<MapConfig>) -> String {
        let candidate = Configuration { floor_maps, ..self.config.clone() };
        self.set_config(candidate)
    }

    /// Replace the editor settings only.
    pub fn set_editor_settings(&mut self, settings: EditorSettings) -> String {
        let candidate = Configuration { editor_settings: settings, ..self.config.clone() };
        self.set_config(candidate)
    }

    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    #[must_use]
    pub fn object_types(&self) -> &[String] {
        &self.config.map_object_types
    }

    #[must_use]
    pub fn map_objects(&self) -> &[MapObjectConfig] {
        &self.config.map_objects
    }

    #[must_use]
    pub fn floor_maps(&self) -> &[MapConfig] {
        &self.config.floor_maps
    }

    /// Look up a floor by id.
    #[must_use]
    pub fn floor_map(&self, id: i64) -> Option<&MapConfig> {
        self.config.floor_maps.iter().find(|f| f.id == id)
    }

    #[must_use]
    pub fn editor_settings(&self) -> &EditorSettings {
        &self.config.editor_settings
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
