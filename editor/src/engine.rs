//! Editing engine: placement, selection, transforms, undo and whole-map
//! load/snapshot over a [`Surface`] and an [`OverlayHost`].
//!
//! DESIGN
//! ======
//! [`EngineCore`] holds all editor state and is driven by the host through
//! synchronous event handlers (`on_pointer_*`, `on_click`, `on_key_*`,
//! `on_selection_scan`) and a few async operations that decode images
//! (`load_map`, `reload`, `set_read_only_mode`, `apply_dependencies`).
//! Handlers return [`Action`]s for the host: redraw notifications, timer
//! requests for the rubber-band scan, and reload requests.
//!
//! Pointer events are routed the way stacked overlay elements would receive
//! them: a point that lands on an interactive overlay belongs to that object
//! and never reaches the canvas placement path. Moving between the canvas and
//! an overlay behaves like leaving and re-entering the canvas.
//!
//! The layer stack owns object state, the history log is the only undo
//! authority, and selection bounds are recomputed inside the same handler
//! that changes selection membership.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::assets::{self, AssetError, AssetStore, ImageHandle};
use crate::catalog::{Catalog, RebuildSummary};
use crate::config::{MapConfig, MapObjectConfig};
use crate::consts::{
    DEFAULT_GRID_SIZE, EDITOR_BORDER_PX, OVERLAY_OFFSET_PX, ROTATION_STEP_DEG, ROTATION_WRAP_DEG,
    SELECTION_SCAN_PERIOD_MS,
};
use crate::geometry::{self, Bounds, ContainmentTest, Padding, Point};
use crate::history::{HistoryBuffer, HistoryEntryKind};
use crate::input::{Button, EditorMode, InputState, Key, Modifiers, Shortcut};
use crate::layers::LayerStack;
use crate::model::{ObjectKey, PlacedObject};
use crate::overlay::{CursorPreview, HeadlessOverlays, OverlayFrame, OverlayHandle, OverlayHost, OverlayStyle};
use crate::render::{self, RasterSurface, RenderError, Scene, Surface};

/// Pointer position recorded when the pointer is off the canvas.
const OFF_CANVAS: Point = Point { x: -1.0, y: -1.0 };

/// Actions returned from engine handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The scene changed; emitted once per scene-affecting operation.
    SceneChanged,
    /// Layer order changed; the host should `reload()` the current floor.
    ReloadRequested,
    /// Start calling [`EngineCore::on_selection_scan`] every `period`.
    StartSelectionScan { period: Duration },
    /// Stop the selection scan timer.
    StopSelectionScan,
    /// The event was handled; suppress its default browser behaviour.
    EventConsumed,
}

/// Engine failures surfaced to callers.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("no floor map is loaded")]
    NoMapLoaded,
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Core engine state and operations, independent of any browser API.
pub struct EngineCore {
    surface: Box<dyn Surface>,
    overlays: Box<dyn OverlayHost>,
    assets: AssetStore,
    catalog: Catalog,
    layers: LayerStack,
    history: HistoryBuffer,
    active: Option<PlacedObject>,
    hovered: Option<ObjectKey>,
    pointer_target: Option<ObjectKey>,
    snap_to_grid: bool,
    grid_size: u32,
    show_grid: bool,
    selecting_mode: bool,
    mouse_pos: Point,
    pointer_over: bool,
    rotation: f64,
    background: Option<ImageHandle>,
    selection: Vec<ObjectKey>,
    selection_bounds: Bounds,
    input: InputState,
    read_only: bool,
    current_floor: Option<MapConfig>,
    preview: CursorPreview,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineCore {
    /// Engine over an in-memory raster surface and headless overlays.
    #[must_use]
    pub fn new() -> Self {
        Self::with_backends(Box::new(RasterSurface::default()), Box::new(HeadlessOverlays::new()))
    }

    /// Engine over host-provided drawing and overlay backends.
    #[must_use]
    pub fn with_backends(surface: Box<dyn Surface>, overlays: Box<dyn OverlayHost>) -> Self {
        Self {
            surface,
            overlays,
            assets: AssetStore::default(),
            catalog: Catalog::new(),
            layers: LayerStack::new(),
            history: HistoryBuffer::new(),
            active: None,
            hovered: None,
            pointer_target: None,
            snap_to_grid: true,
            grid_size: DEFAULT_GRID_SIZE,
            show_grid: true,
            selecting_mode: false,
            mouse_pos: OFF_CANVAS,
            pointer_over: false,
            rotation: 0.0,
            background: None,
            selection: Vec::new(),
            selection_bounds: Bounds::empty(),
            input: InputState::Idle,
            read_only: false,
            current_floor: None,
            preview: CursorPreview::default(),
        }
    }

    // --- Dependencies ---

    /// Replace the asset store, rebuild the catalog and reset the scene.
    pub async fn apply_dependencies(&mut self, assets: AssetStore, objects: &[MapObjectConfig]) -> RebuildSummary {
        self.assets = assets;
        let summary = self.catalog.rebuild(objects, &self.assets).await;
        if let Some(kind) = self.active.as_ref().map(|a| a.kind.clone()) {
            if !self.set_active_object(&kind) {
                self.active = None;
                self.preview.kind = None;
                self.preview.visible = false;
                self.sync_preview();
            }
        }
        self.clear();
        summary
    }

    // --- Settings ---

    /// Enable or disable snapping placements to grid-cell centers.
    pub fn set_snap_to_grid(&mut self, snap: bool) {
        self.snap_to_grid = snap;
    }

    /// Show (`Some(true)`), hide (`Some(false)`) or flip (`None`) the grid.
    pub fn toggle_grid(&mut self, show: Option<bool>) -> Vec<Action> {
        self.show_grid = show.unwrap_or(!self.show_grid);
        self.redraw();
        vec![Action::SceneChanged]
    }

    /// Select the object type placed by clicks. Returns false for an unknown type.
    pub fn set_active_object(&mut self, kind: &str) -> bool {
        let Some(template) = self.catalog.get(kind) else {
            return false;
        };
        self.preview.kind = Some(template.kind.clone());
        self.preview.width = template.width();
        self.preview.height = template.height();
        self.active = Some(template);
        self.update_preview_rotation();
        true
    }

    /// Turn the working rotation by -45 degrees. Returns the new rotation.
    pub fn rotate45(&mut self) -> f64 {
        self.rotation -= ROTATION_STEP_DEG;
        if self.rotation < ROTATION_WRAP_DEG {
            self.rotation += 360.0;
        }
        self.update_preview_rotation();
        self.rotation
    }

    // --- Placement / undo ---

    /// Place the active object type at a pointer position.
    pub fn place_object(&mut self, x: f64, y: f64) -> Vec<Action> {
        if self.read_only {
            return Vec::new();
        }
        match self.place_at(Point::new(x, y)) {
            Some(_) => vec![Action::SceneChanged],
            None => Vec::new(),
        }
    }

    /// Undo the newest insertion whose object is still on the map.
    pub fn undo(&mut self) -> Vec<Action> {
        if self.read_only {
            return Vec::new();
        }
        while let Some(entry) = self.history.pop() {
            if entry.kind != HistoryEntryKind::AddObject {
                continue;
            }
            let live: Vec<ObjectKey> = entry.affected.iter().copied().filter(|k| self.layers.contains(*k)).collect();
            if live.is_empty() {
                continue;
            }
            for key in live {
                self.remove_placed(key);
            }
            self.redraw();
            return vec![Action::SceneChanged];
        }
        Vec::new()
    }

    /// Remove every object and overlay and repaint the empty floor.
    pub fn clear(&mut self) {
        for obj in self.layers.clear() {
            if let Some(handle) = obj.overlay {
                self.overlays.destroy(handle.id());
            }
        }
        self.history.clear();
        self.selection.clear();
        self.selection_bounds = Bounds::empty();
        self.hovered = None;
        self.pointer_target = None;
        let grid = self.show_grid.then_some(self.grid_size);
        if let Err(e) = render::clean(self.surface.as_mut(), self.background.as_ref(), grid) {
            error!(error = %e, "clean failed");
        }
    }

    // --- Layer order ---

    /// Move the hovered object to the top of the draw order.
    pub fn bring_to_top(&mut self) -> Vec<Action> {
        match self.hovered {
            Some(key) if !self.read_only && self.layers.bring_to_top(key) => self.restacked(),
            _ => Vec::new(),
        }
    }

    /// Move the hovered object to the bottom of the draw order.
    pub fn bring_to_bottom(&mut self) -> Vec<Action> {
        match self.hovered {
            Some(key) if !self.read_only && self.layers.bring_to_bottom(key) => self.restacked(),
            _ => Vec::new(),
        }
    }

    /// Mirror the new layer order on the overlay host; the host reloads the
    /// floor to repaint.
    fn restacked(&mut self) -> Vec<Action> {
        let order: Vec<_> = self.layers.iter().filter_map(|o| o.overlay().map(OverlayHandle::id)).collect();
        self.overlays.restack(&order);
        vec![Action::ReloadRequested]
    }

    // --- Load / save ---

    /// Replace the scene with `map`: load its background, then replay each
    /// item through the placement path in array order.
    pub async fn load_map(&mut self, map: MapConfig) -> Vec<Action> {
        let mut actions = self.end_drag();
        self.clear();
        self.set_background(&map.background_image).await;
        info!(floor = map.id, items = map.items.len(), "loading floor map");

        let saved_active = self.active.as_ref().map(|a| a.kind.clone());
        let saved_rotation = self.rotation;
        let saved_snap = self.snap_to_grid;
        self.snap_to_grid = false;

        for item in &map.items {
            if !self.set_active_object(&item.kind) {
                warn!(floor = map.id, kind = %item.kind, "unknown object type; item skipped");
                continue;
            }
            self.rotation = item.rotation;
            self.update_preview_rotation();
            if let Some(key) = self.place_at(Point::new(item.x, item.y)) {
                if let Some(obj) = self.layers.find_mut(key) {
                    obj.name.clone_from(&item.name);
                    obj.options.clone_from(&item.options);
                }
            }
        }

        actions.extend(self.canvas_leave());
        self.rotation = saved_rotation;
        self.snap_to_grid = saved_snap;
        match saved_active {
            Some(kind) => {
                self.set_active_object(&kind);
            }
            None => {
                self.active = None;
                self.preview.kind = None;
                self.update_preview_rotation();
            }
        }

        self.current_floor = Some(map);
        actions.push(Action::SceneChanged);
        actions
    }

    /// Serialize the live scene as a floor map, including a PNG of the canvas.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoMapLoaded`] before the first `load_map`, or a
    /// render error if the canvas cannot be encoded.
    pub fn snapshot_map(&self) -> Result<MapConfig, EditorError> {
        let floor = self.current_floor.as_ref().ok_or(EditorError::NoMapLoaded)?;
        Ok(MapConfig {
            id: floor.id,
            icon: floor.icon.clone(),
            background_image: floor.background_image.clone(),
            rendered_image: self.surface.to_png_data_url()?,
            map_width: self.background.as_ref().map(ImageHandle::width),
            map_height: self.background.as_ref().map(ImageHandle::height),
            items: self.layers.iter().map(PlacedObject::to_map_item).collect(),
        })
    }

    /// Rebuild the current floor from a fresh snapshot.
    pub async fn reload(&mut self) -> Vec<Action> {
        if self.current_floor.is_none() {
            return Vec::new();
        }
        match self.snapshot_map() {
            Ok(map) => self.load_map(map).await,
            Err(e) => {
                error!(error = %e, "reload snapshot failed");
                Vec::new()
            }
        }
    }

    /// Enter or leave read-only mode and rebuild overlays accordingly.
    pub async fn set_read_only_mode(&mut self, read_only: bool) -> Vec<Action> {
        let mut actions = self.end_drag();
        self.read_only = read_only;
        self.selecting_mode = false;
        if read_only {
            self.preview.visible = false;
            self.sync_preview();
        }
        actions.extend(self.reload().await);
        actions
    }

    // --- Selection ---

    /// Add `key` to the selection, or remove it if already selected.
    pub fn toggle_selection(&mut self, key: ObjectKey) {
        let Some(frame) = self.layers.find(key).and_then(|o| o.overlay()).map(|h| *h.frame()) else {
            return;
        };
        if let Some(idx) = self.selection.iter().position(|k| *k == key) {
            self.selection.remove(idx);
            self.mark_selected(key, false);
            self.recompute_selection_bounds();
        } else {
            self.selection.push(key);
            self.mark_selected(key, true);
            self.selection_bounds.expand(&frame.bounds());
        }
    }

    /// Deselect everything. With `refresh`, replay the last pointer position
    /// so the placement preview reappears.
    pub fn clear_selection(&mut self, refresh: bool) -> Vec<Action> {
        for key in std::mem::take(&mut self.selection) {
            self.mark_selected(key, false);
        }
        self.recompute_selection_bounds();
        if refresh { self.refresh_pointer() } else { Vec::new() }
    }

    /// Move every selected object by `(dx, dy)`. A move that would push the
    /// selection bounds past the canvas edge is ignored.
    pub fn transform_selection(&mut self, dx: f64, dy: f64) -> Vec<Action> {
        if self.read_only || self.selection.is_empty() {
            return Vec::new();
        }
        let (w, h) = self.surface.size();
        let (w, h) = (f64::from(w), f64::from(h));
        let b = self.selection_bounds;
        if (dx > 0.0 && b.right + dx >= w - EDITOR_BORDER_PX)
            || (dx < 0.0 && b.left + dx <= 0.0)
            || (dy > 0.0 && b.bottom + dy >= h - EDITOR_BORDER_PX)
            || (dy < 0.0 && b.top + dy <= 0.0)
        {
            return Vec::new();
        }

        for key in &self.selection {
            let Some(obj) = self.layers.find_mut(*key) else {
                continue;
            };
            obj.x += dx;
            obj.y += dy;
            if let Some(handle) = obj.overlay.as_mut() {
                handle.translate(dx, dy);
                self.overlays.reposition(handle.id(), handle.frame().left, handle.frame().top);
            }
        }
        self.selection_bounds.translate(dx, dy);
        self.redraw();
        vec![Action::SceneChanged]
    }

    /// Remove every selected object.
    pub fn delete_selected_objects(&mut self) -> Vec<Action> {
        if self.read_only || self.selection.is_empty() {
            return Vec::new();
        }
        for key in self.selection.clone() {
            self.remove_placed(key);
        }
        let mut actions = self.clear_selection(true);
        self.redraw();
        actions.push(Action::SceneChanged);
        actions
    }

    /// Remove the object under the pointer.
    pub fn remove_hovered(&mut self) -> Vec<Action> {
        let Some(key) = self.hovered else {
            return Vec::new();
        };
        if self.read_only {
            return Vec::new();
        }
        self.remove_placed(key);
        self.redraw();
        let mut actions = self.refresh_pointer();
        actions.push(Action::SceneChanged);
        actions
    }

    // --- Pointer events ---

    /// Pointer moved to canvas position `pt`.
    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        if self.read_only {
            return Vec::new();
        }
        let mut actions = Vec::new();
        let target = self.overlay_at(pt);
        if target != self.pointer_target {
            if let Some(old) = self.pointer_target {
                self.overlay_leave(old);
            }
            match (self.pointer_target, target) {
                (None, Some(_)) => actions.extend(self.canvas_leave()),
                (Some(_), None) => self.canvas_enter(),
                _ => {}
            }
            if let Some(new) = target {
                self.overlay_enter(new);
            }
            self.pointer_target = target;
        }

        if target.is_some() {
            self.mouse_pos = pt;
        } else {
            self.canvas_move(pt);
        }
        actions
    }

    /// Pointer button pressed at `pt`. Starts a rubber-band selection in
    /// selection mode.
    pub fn on_pointer_down(&mut self, pt: Point, button: Button) -> Vec<Action> {
        if self.read_only || button != Button::Primary || self.overlay_at(pt).is_some() {
            return Vec::new();
        }
        if !self.in_selection_mode() {
            return Vec::new();
        }
        let mut actions = self.clear_selection(false);
        self.input = InputState::DragSelecting { start: pt, rect: None, scanning: true };
        self.set_overlays_interactive(false);
        actions.push(Action::StartSelectionScan { period: Duration::from_millis(SELECTION_SCAN_PERIOD_MS) });
        actions
    }

    /// Pointer button released over the canvas.
    pub fn on_pointer_up(&mut self, pt: Point, _button: Button) -> Vec<Action> {
        if self.read_only || self.overlay_at(pt).is_some() {
            return Vec::new();
        }
        self.stop_scan()
    }

    /// Pointer entered the editor area.
    pub fn on_pointer_enter(&mut self) -> Vec<Action> {
        if !self.read_only {
            self.canvas_enter();
        }
        Vec::new()
    }

    /// Pointer left the editor area.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        if self.read_only {
            return Vec::new();
        }
        if let Some(old) = self.pointer_target.take() {
            self.overlay_leave(old);
        }
        self.canvas_leave()
    }

    /// Click at `pt`. On an object: Ctrl toggles its selection. On the canvas:
    /// ends a drag, clears the selection, or places the active object.
    pub fn on_click(&mut self, pt: Point, mods: Modifiers) -> Vec<Action> {
        if self.read_only {
            return Vec::new();
        }
        if let Some(key) = self.overlay_at(pt) {
            let selected = self.selection.contains(&key);
            if mods.ctrl {
                self.toggle_selection(key);
            } else if !selected && self.in_selection_mode() {
                return self.clear_selection(false);
            }
            return Vec::new();
        }

        if self.input.is_drag_selecting() {
            self.input = InputState::Idle;
            Vec::new()
        } else if self.in_selection_mode() {
            self.clear_selection(true)
        } else {
            self.place_object(pt.x, pt.y)
        }
    }

    /// Periodic rubber-band scan: select exactly the objects whose overlay
    /// box overlaps the current selection rectangle.
    pub fn on_selection_scan(&mut self) -> Vec<Action> {
        let InputState::DragSelecting { rect, scanning: true, .. } = self.input else {
            return Vec::new();
        };
        let flips: Vec<ObjectKey> = self
            .layers
            .iter()
            .filter_map(|obj| {
                let frame = obj.overlay()?.frame();
                let overlaps = rect.is_some_and(|r| frame.bounds().overlaps(&r));
                (overlaps != obj.is_selected).then_some(obj.key())
            })
            .collect();
        for key in flips {
            self.toggle_selection(key);
        }
        Vec::new()
    }

    // --- Keyboard events ---

    /// Key pressed. Holds selection mode and nudges the selection with arrows.
    pub fn on_key_down(&mut self, key: &Key, mods: Modifiers) -> Vec<Action> {
        if self.read_only {
            return Vec::new();
        }
        if key.is_selection_modifier() && !self.selecting_mode {
            self.selecting_mode = true;
            self.preview.visible = false;
            self.sync_preview();
        }
        if self.in_selection_mode() {
            if let Some((dx, dy)) = key.nudge(mods) {
                let mut actions = self.transform_selection(dx, dy);
                actions.push(Action::EventConsumed);
                return actions;
            }
        }
        Vec::new()
    }

    /// Key released. Runs shortcuts and leaves selection mode.
    pub fn on_key_up(&mut self, key: &Key, mods: Modifiers) -> Vec<Action> {
        if self.read_only {
            return Vec::new();
        }
        let mut actions = match Shortcut::from_key(key, mods) {
            Some(shortcut) => self.run_shortcut(shortcut),
            None => Vec::new(),
        };

        if key.is_selection_modifier() {
            self.selecting_mode = false;
            if !self.in_selection_mode() && self.pointer_over {
                self.canvas_move(self.mouse_pos);
            }
        }
        actions.dedup();
        actions
    }

    fn run_shortcut(&mut self, shortcut: Shortcut) -> Vec<Action> {
        debug!(?shortcut, "shortcut");
        match shortcut {
            Shortcut::Undo => {
                let mut actions = self.undo();
                actions.push(Action::EventConsumed);
                actions
            }
            Shortcut::Rotate => {
                self.rotate45();
                vec![Action::EventConsumed]
            }
            Shortcut::Delete => {
                let mut actions = if self.hovered.is_some() && !self.in_selection_mode() {
                    self.remove_hovered()
                } else if self.in_selection_mode() {
                    self.delete_selected_objects()
                } else {
                    return Vec::new();
                };
                self.hovered = None;
                actions.extend(self.refresh_pointer());
                actions.push(Action::EventConsumed);
                actions
            }
            Shortcut::ToggleGrid => self.toggle_grid(None),
            Shortcut::BringToBottom => self.bring_to_bottom(),
            Shortcut::BringToTop => self.bring_to_top(),
        }
    }

    // --- Queries ---

    /// Observable editor mode.
    #[must_use]
    pub fn mode(&self) -> EditorMode {
        if self.read_only {
            EditorMode::ReadOnly
        } else if self.in_selection_mode() {
            EditorMode::Selecting
        } else if self.active.is_some() {
            EditorMode::Placing
        } else {
            EditorMode::Idle
        }
    }

    #[must_use]
    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    #[must_use]
    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    /// Selected objects in selection order.
    #[must_use]
    pub fn selection(&self) -> &[ObjectKey] {
        &self.selection
    }

    /// Axis-aligned box around the selected overlays; empty when nothing is selected.
    #[must_use]
    pub fn selection_bounds(&self) -> Bounds {
        self.selection_bounds
    }

    #[must_use]
    pub fn hovered(&self) -> Option<ObjectKey> {
        self.hovered
    }

    #[must_use]
    pub fn active_object(&self) -> Option<&PlacedObject> {
        self.active.as_ref()
    }

    /// Working rotation applied to the next placement.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[must_use]
    pub fn is_grid_visible(&self) -> bool {
        self.show_grid
    }

    #[must_use]
    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    #[must_use]
    pub fn snaps_to_grid(&self) -> bool {
        self.snap_to_grid
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    #[must_use]
    pub fn current_floor(&self) -> Option<&MapConfig> {
        self.current_floor.as_ref()
    }

    #[must_use]
    pub fn background(&self) -> Option<&ImageHandle> {
        self.background.as_ref()
    }

    #[must_use]
    pub fn preview(&self) -> &CursorPreview {
        &self.preview
    }

    #[must_use]
    pub fn input_state(&self) -> InputState {
        self.input
    }

    #[must_use]
    pub fn mouse_pos(&self) -> Point {
        self.mouse_pos
    }

    #[must_use]
    pub fn surface(&self) -> &dyn Surface {
        self.surface.as_ref()
    }

    #[must_use]
    pub fn overlays(&self) -> &dyn OverlayHost {
        self.overlays.as_ref()
    }

    // --- Internals: placement ---

    fn in_selection_mode(&self) -> bool {
        !self.selection.is_empty() || self.selecting_mode
    }

    /// Center for an object placed at `pt` under the current snap setting.
    fn placement_center(&self, pt: Point) -> Point {
        if self.snap_to_grid { geometry::snap_to_grid(pt, self.grid_size) } else { pt }
    }

    fn place_at(&mut self, pt: Point) -> Option<ObjectKey> {
        let mut obj = self.active.clone()?;
        let center = self.placement_center(pt);
        obj.x = center.x;
        obj.y = center.y;
        obj.rotation = self.rotation;

        if let Err(e) = render::draw_object(self.surface.as_mut(), &obj, &self.catalog) {
            error!(kind = %obj.kind, error = %e, "draw failed");
        }

        let frame = OverlayFrame::for_object(center, obj.width(), obj.height(), obj.rotation);
        let handle = OverlayHandle::new(frame, !self.read_only);
        self.overlays.create(handle.id(), &frame, handle.is_interactive());
        self.overlays.rotate(handle.id(), obj.rotation);
        let overlay_id = handle.id();
        obj.overlay = Some(handle);

        let key = self.layers.add(obj);
        if let Some(layer_id) = self.layers.find(key).and_then(|o| o.id) {
            self.overlays.set_ref_id(overlay_id, layer_id);
        }
        self.history.push(HistoryEntryKind::AddObject, vec![key]);
        Some(key)
    }

    /// Take an object off the map with its overlay, keeping selection and
    /// hover state consistent.
    fn remove_placed(&mut self, key: ObjectKey) -> Option<PlacedObject> {
        let obj = self.layers.remove_object(key)?;
        if let Some(handle) = &obj.overlay {
            self.overlays.destroy(handle.id());
        }
        if let Some(idx) = self.selection.iter().position(|k| *k == key) {
            self.selection.remove(idx);
            self.recompute_selection_bounds();
        }
        if self.hovered == Some(key) {
            self.hovered = None;
        }
        if self.pointer_target == Some(key) {
            self.pointer_target = None;
        }
        Some(obj)
    }

    async fn set_background(&mut self, name: &str) {
        let Some(data) = self.assets.get_other(name) else {
            warn!(image = %name, "background asset not found");
            self.background = None;
            self.redraw();
            return;
        };
        match assets::load_image(data).await {
            Ok(image) => {
                if let Err(e) = self.surface.resize(image.width(), image.height()) {
                    error!(error = %e, "surface resize failed");
                }
                self.background = Some(image);
            }
            Err(e) => {
                error!(image = %name, error = %e, "background failed to load");
                self.background = None;
            }
        }
        self.redraw();
    }

    fn redraw(&mut self) {
        let scene = Scene {
            background: self.background.as_ref(),
            grid: self.show_grid.then_some(self.grid_size),
            layers: &self.layers,
            catalog: &self.catalog,
        };
        if let Err(e) = render::draw(self.surface.as_mut(), &scene) {
            error!(error = %e, "redraw failed");
        }
    }

    // --- Internals: pointer routing ---

    /// Topmost interactive overlay whose padded, rotated box contains `pt`.
    fn overlay_at(&self, pt: Point) -> Option<ObjectKey> {
        let padding = Padding::uniform(OVERLAY_OFFSET_PX);
        self.layers
            .iter()
            .rev()
            .filter(|o| o.overlay().is_some_and(OverlayHandle::is_interactive))
            .find(|o| geometry::contains_point_with(&o.rect(), pt, padding, ContainmentTest::Tolerant))
            .map(PlacedObject::key)
    }

    fn overlay_enter(&mut self, key: ObjectKey) {
        if self.read_only || self.selection.contains(&key) {
            return;
        }
        self.set_style(key, OverlayStyle::Hovered);
        self.hovered = Some(key);
    }

    fn overlay_leave(&mut self, key: ObjectKey) {
        if !self.selection.contains(&key) {
            self.set_style(key, OverlayStyle::Idle);
        }
        if self.hovered == Some(key) {
            self.hovered = None;
        }
    }

    fn canvas_enter(&mut self) {
        self.pointer_over = true;
        if self.active.is_some() && !self.in_selection_mode() {
            self.preview.visible = true;
            self.sync_preview();
        }
    }

    fn canvas_leave(&mut self) -> Vec<Action> {
        let actions = self.end_drag();
        self.mouse_pos = OFF_CANVAS;
        self.pointer_over = false;
        if !self.in_selection_mode() {
            self.preview.visible = false;
            self.sync_preview();
        }
        actions
    }

    fn canvas_move(&mut self, pt: Point) {
        self.mouse_pos = pt;
        self.pointer_over = true;

        if let InputState::DragSelecting { start, scanning: true, .. } = self.input {
            let rect = Bounds::spanning(start, pt);
            self.input = InputState::DragSelecting { start, rect: Some(rect), scanning: true };
            self.overlays.present_selection_box(Some(&rect));
        }

        let Some((w, h)) = self.active.as_ref().map(|a| (a.width(), a.height())) else {
            return;
        };
        let tl = geometry::top_left(self.placement_center(pt), w, h);
        self.preview.left = tl.x;
        self.preview.top = tl.y;
        if !self.in_selection_mode() && !self.input.is_drag_selecting() {
            self.preview.visible = true;
        }
        self.sync_preview();
    }

    /// Replay the last pointer position if the pointer is over the canvas.
    fn refresh_pointer(&mut self) -> Vec<Action> {
        if self.pointer_over && self.pointer_target.is_none() {
            self.canvas_move(self.mouse_pos);
        }
        Vec::new()
    }

    /// Stop the overlap scan and hide the rubber band, keeping the drag
    /// marker so the trailing click is swallowed.
    fn stop_scan(&mut self) -> Vec<Action> {
        let InputState::DragSelecting { start, rect, scanning } = self.input else {
            return Vec::new();
        };
        self.input = InputState::DragSelecting { start, rect, scanning: false };
        self.overlays.present_selection_box(None);
        self.set_overlays_interactive(true);
        if scanning { vec![Action::StopSelectionScan] } else { Vec::new() }
    }

    fn end_drag(&mut self) -> Vec<Action> {
        let actions = self.stop_scan();
        self.input = InputState::Idle;
        actions
    }

    // --- Internals: overlays ---

    fn set_overlays_interactive(&mut self, enable: bool) {
        let interactive = enable && !self.read_only;
        for obj in self.layers.iter_mut() {
            if let Some(handle) = obj.overlay.as_mut() {
                handle.set_interactive(interactive);
                self.overlays.set_interactive(handle.id(), interactive);
            }
        }
    }

    fn set_style(&mut self, key: ObjectKey, style: OverlayStyle) {
        if let Some(handle) = self.layers.find_mut(key).and_then(|o| o.overlay.as_mut()) {
            handle.set_style(style);
            self.overlays.set_style(handle.id(), style);
        }
    }

    fn mark_selected(&mut self, key: ObjectKey, selected: bool) {
        if let Some(obj) = self.layers.find_mut(key) {
            obj.is_selected = selected;
        }
        self.set_style(key, if selected { OverlayStyle::Selected } else { OverlayStyle::Idle });
    }

    fn recompute_selection_bounds(&mut self) {
        let mut bounds = Bounds::empty();
        for key in &self.selection {
            if let Some(handle) = self.layers.find(*key).and_then(PlacedObject::overlay) {
                bounds.expand(&handle.frame().bounds());
            }
        }
        self.selection_bounds = bounds;
    }

    fn update_preview_rotation(&mut self) {
        self.preview.transform_deg = 360.0 - self.rotation;
        self.sync_preview();
    }

    fn sync_preview(&mut self) {
        self.overlays.present_preview(&self.preview);
    }
}
