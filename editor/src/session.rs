//! Editor session: ties the configuration service to the engine.
//!
//! DESIGN
//! ======
//! The session is what a host embeds. It accepts whole configurations,
//! applies them to the engine (assets, catalog, editor settings, user roles,
//! current floor), and keeps the floor list in the configuration service up
//! to date as the user switches floors, imports single-floor documents or
//! exports the whole configuration.
//!
//! Floors live in the configuration; the engine only ever holds the one being
//! edited. Before the engine moves to another floor, the current scene is
//! snapshotted back into the floor list so edits are never dropped.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assets::AssetStore;
use crate::config::{ConfigService, Configuration, EditorSettings, MapConfig};
use crate::engine::{Action, EditorError, EngineCore};

/// Permission level of the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Everything, including the configuration toolbar.
    Admin,
    /// Look only.
    Viewer,
    /// Move, add and remove furniture.
    MapEditor,
    /// Edit employee locations.
    EmployeesEditor,
}

/// Toolbars a host should show for the current roles.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToolbarVisibility {
    pub admin: bool,
    pub objects: bool,
    pub tools: bool,
    pub aside_margin: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The configuration service rejected an update; carries its message.
    #[error("configuration rejected:\n{0}")]
    Rejected(String),
    #[error("floor map {0} does not exist")]
    UnknownFloor(i64),
    #[error(transparent)]
    Editor(#[from] EditorError),
}

pub struct EditorSession {
    config: ConfigService,
    engine: EngineCore,
    settings: EditorSettings,
    roles: Vec<Role>,
    visible: ToolbarVisibility,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EngineCore::new())
    }
}

impl EditorSession {
    /// Session around `engine`. Until roles are set the user is a viewer.
    #[must_use]
    pub fn new(engine: EngineCore) -> Self {
        Self {
            config: ConfigService::new(),
            engine,
            settings: EditorSettings::default(),
            roles: vec![Role::Viewer],
            visible: ToolbarVisibility::default(),
        }
    }

    // --- Accessors ---

    #[must_use]
    pub fn engine(&self) -> &EngineCore {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut EngineCore {
        &mut self.engine
    }

    #[must_use]
    pub fn config(&self) -> &ConfigService {
        &self.config
    }

    /// Working editor settings, including the floor currently shown.
    #[must_use]
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    #[must_use]
    pub fn visibility(&self) -> ToolbarVisibility {
        self.visible
    }

    // --- Configuration ---

    /// Validate and apply a whole configuration. Returns the validation
    /// message; empty means the configuration was accepted and loaded.
    pub async fn set_configuration(&mut self, config: Configuration) -> String {
        let msg = self.config.set_config(config);
        if !msg.is_empty() {
            warn!(revision = self.config.revision(), "configuration rejected");
            return msg;
        }
        self.apply_configuration().await;
        String::new()
    }

    /// Push the accepted configuration into the engine and open its current floor.
    async fn apply_configuration(&mut self) -> Vec<Action> {
        let cfg = self.config.configuration().clone();
        let summary = self.engine.apply_dependencies(AssetStore::from_config(&cfg.assets), &cfg.map_objects).await;
        info!(
            revision = self.config.revision(),
            types = summary.loaded,
            failed = summary.failed,
            floors = cfg.floor_maps.len(),
            "configuration applied"
        );

        self.settings = cfg.editor_settings.clone();
        self.engine.set_snap_to_grid(self.settings.snap_to_grid);
        self.engine.toggle_grid(Some(self.settings.show_grid));

        let mut actions = self.apply_roles(self.roles.clone()).await;
        if let Some(first) = cfg.map_object_types.first() {
            self.engine.set_active_object(first);
        }
        actions.extend(self.load_current_floor().await);
        actions
    }

    /// Load the floor named by the working settings.
    pub async fn load_current_floor(&mut self) -> Vec<Action> {
        let id = self.settings.current_floor_map;
        match self.config.floor_map(id) {
            Some(map) => {
                let map = map.clone();
                self.engine.load_map(map).await
            }
            None => {
                warn!(floor = id, "current floor map not found");
                Vec::new()
            }
        }
    }

    // --- Roles ---

    /// Apply the user's roles: viewers (or users without roles) get a
    /// read-only map without the grid; admins and map editors can edit.
    /// Any other combination (e.g. only `employees-editor`) hides the
    /// toolbars and keeps the current editing mode.
    pub async fn apply_roles(&mut self, roles: Vec<Role>) -> Vec<Action> {
        self.roles = roles;
        self.visible = ToolbarVisibility::default();

        if self.roles.is_empty() || self.roles == [Role::Viewer] {
            let mut actions = self.engine.toggle_grid(Some(false));
            actions.extend(self.engine.set_read_only_mode(true).await);
            return actions;
        }

        let admin = self.roles.contains(&Role::Admin);
        let editable = admin || self.roles.contains(&Role::MapEditor);
        if !editable {
            return Vec::new();
        }
        self.visible = ToolbarVisibility { admin, objects: true, tools: true, aside_margin: true };
        if self.engine.is_read_only() {
            return self.engine.set_read_only_mode(false).await;
        }
        Vec::new()
    }

    // --- Floors ---

    /// Show another floor, saving the current one back into the floor list first.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the floor does not exist or the current scene cannot
    /// be saved.
    pub async fn switch_floor(&mut self, id: i64) -> Result<Vec<Action>, SessionError> {
        let Some(target) = self.config.floor_map(id).cloned() else {
            return Err(SessionError::UnknownFloor(id));
        };
        let mut actions = Vec::new();
        if self.engine.current_floor().map(|f| f.id) != Some(id) {
            self.save_current_floor()?;
            actions = self.engine.load_map(target).await;
        }
        self.settings.current_floor_map = id;
        Ok(actions)
    }

    /// Replace the background, rendered image and items of the floor with the
    /// same id as `map`, then show it.
    ///
    /// # Errors
    ///
    /// Returns `Err` if no floor has that id or the result fails validation.
    pub async fn import_map(&mut self, map: MapConfig) -> Result<Vec<Action>, SessionError> {
        let mut floors = self.config.floor_maps().to_vec();
        let Some(target) = floors.iter_mut().find(|f| f.id == map.id) else {
            return Err(SessionError::UnknownFloor(map.id));
        };
        target.background_image = map.background_image;
        target.rendered_image = map.rendered_image;
        target.items = map.items;

        let msg = self.config.set_floor_maps(floors);
        if !msg.is_empty() {
            return Err(SessionError::Rejected(msg));
        }
        info!(floor = map.id, "floor map imported");
        self.settings.current_floor_map = map.id;
        Ok(self.load_current_floor().await)
    }

    /// Current floor as a standalone document.
    ///
    /// # Errors
    ///
    /// Returns `Err` if no floor is loaded or the canvas cannot be encoded.
    pub fn export_current_floor(&self) -> Result<MapConfig, SessionError> {
        Ok(self.engine.snapshot_map()?)
    }

    /// Save the current floor and settings into the configuration and return it.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the scene cannot be snapshotted or the updated
    /// configuration fails validation.
    pub fn export_configuration(&mut self) -> Result<Configuration, SessionError> {
        self.save_current_floor()?;
        let msg = self.config.set_editor_settings(self.settings.clone());
        if !msg.is_empty() {
            return Err(SessionError::Rejected(msg));
        }
        Ok(self.config.configuration().clone())
    }

    /// Run the host-side follow-ups of engine actions and return the rest.
    pub async fn dispatch(&mut self, actions: Vec<Action>) -> Vec<Action> {
        let mut out = Vec::new();
        for action in actions {
            if action == Action::ReloadRequested {
                out.extend(self.engine.reload().await);
            } else {
                out.push(action);
            }
        }
        out
    }

    fn save_current_floor(&mut self) -> Result<(), SessionError> {
        let snapshot = match self.engine.snapshot_map() {
            Ok(map) => map,
            Err(EditorError::NoMapLoaded) => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        let mut floors = self.config.floor_maps().to_vec();
        if let Some(floor) = floors.iter_mut().find(|f| f.id == snapshot.id) {
            floor.items = snapshot.items;
            floor.rendered_image = snapshot.rendered_image;
            floor.background_image = snapshot.background_image;
            floor.map_width = snapshot.map_width;
            floor.map_height = snapshot.map_height;
        }
        let msg = self.config.set_floor_maps(floors);
        if msg.is_empty() { Ok(()) } else { Err(SessionError::Rejected(msg)) }
    }
}
