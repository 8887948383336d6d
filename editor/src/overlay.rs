//! Interactive overlays: the per-object hover/selection handles, the cursor
//! preview and the rubber-band selection box.
//!
//! The engine owns one [`OverlayHandle`] per placed object and keeps the
//! authoritative overlay geometry there. Every change is mirrored to an
//! [`OverlayHost`], the rendering-surface side of the capability. The
//! [`HeadlessOverlays`] host records state in memory; the `web` feature
//! provides a DOM-backed host.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use std::collections::HashMap;

use uuid::Uuid;

use crate::consts::{OVERLAY_OFFSET_PX, OVERLAY_PADDING_PX};
use crate::geometry::{self, Bounds, Point};

/// Identifier of an overlay element on the host.
pub type OverlayId = Uuid;

/// Visual state of an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayStyle {
    /// Invisible, green dashed border when shown.
    #[default]
    Idle,
    /// Pointer is over the object.
    Hovered,
    /// Object is part of the selection.
    Selected,
}

/// Un-rotated box of an overlay element plus its rotation transform.
///
/// `left`/`top` locate the outer box; `width`/`height` are the client extent
/// (object size plus padding on both sides). Selection bounds and rubber-band
/// overlap are computed from this box, ignoring rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayFrame {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Object rotation in degrees, clockwise-positive.
    pub rotation: f64,
}

impl OverlayFrame {
    /// Frame for an object centered on `center`.
    #[must_use]
    pub fn for_object(center: Point, width: u32, height: u32, rotation: f64) -> Self {
        let tl = geometry::top_left(center, width, height);
        Self {
            left: tl.x - OVERLAY_OFFSET_PX,
            top: tl.y - OVERLAY_OFFSET_PX,
            width: f64::from(width) + 2.0 * OVERLAY_PADDING_PX,
            height: f64::from(height) + 2.0 * OVERLAY_PADDING_PX,
            rotation,
        }
    }

    /// Axis-aligned screen rectangle of the frame.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::from_origin(self.left, self.top, self.width, self.height)
    }
}

/// Engine-owned reference to an object's overlay element.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayHandle {
    id: OverlayId,
    ref_id: Option<u32>,
    frame: OverlayFrame,
    style: OverlayStyle,
    interactive: bool,
}

impl OverlayHandle {
    pub(crate) fn new(frame: OverlayFrame, interactive: bool) -> Self {
        Self { id: Uuid::new_v4(), ref_id: None, frame, style: OverlayStyle::Idle, interactive }
    }

    #[must_use]
    pub fn id(&self) -> OverlayId {
        self.id
    }

    /// Layer id of the object this overlay belongs to, once it is on the stack.
    #[must_use]
    pub fn ref_id(&self) -> Option<u32> {
        self.ref_id
    }

    #[must_use]
    pub fn frame(&self) -> &OverlayFrame {
        &self.frame
    }

    #[must_use]
    pub fn style(&self) -> OverlayStyle {
        self.style
    }

    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub(crate) fn set_ref_id(&mut self, ref_id: u32) {
        self.ref_id = Some(ref_id);
    }

    pub(crate) fn set_style(&mut self, style: OverlayStyle) {
        self.style = style;
    }

    pub(crate) fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub(crate) fn translate(&mut self, dx: f64, dy: f64) {
        self.frame.left += dx;
        self.frame.top += dy;
    }
}

/// Semi-transparent image of the active object type following the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorPreview {
    /// Active object type, if one is selected.
    pub kind: Option<String>,
    pub visible: bool,
    pub left: f64,
    pub top: f64,
    pub width: u32,
    pub height: u32,
    /// CSS-style rotation in degrees (`360 - rotation`).
    pub transform_deg: f64,
}

impl Default for CursorPreview {
    fn default() -> Self {
        Self { kind: None, visible: false, left: 0.0, top: 0.0, width: 0, height: 0, transform_deg: 360.0 }
    }
}

/// Rendering-surface side of the overlay capability.
///
/// Implementations draw whatever stands for an interactive element on their
/// surface. Hit-testing stays in the engine; a host only needs to reflect the
/// `interactive` flag (e.g. pointer-event passthrough).
pub trait OverlayHost {
    /// Create a new overlay element.
    fn create(&mut self, id: OverlayId, frame: &OverlayFrame, interactive: bool);
    /// Move an element's outer box.
    fn reposition(&mut self, id: OverlayId, left: f64, top: f64);
    /// Set an element's rotation transform (object rotation, clockwise-positive).
    fn rotate(&mut self, id: OverlayId, rotation: f64);
    /// Apply a visual style.
    fn set_style(&mut self, id: OverlayId, style: OverlayStyle);
    /// Enable or disable pointer interaction.
    fn set_interactive(&mut self, id: OverlayId, interactive: bool);
    /// Tag an element with its object's layer id for reverse lookup.
    fn set_ref_id(&mut self, id: OverlayId, ref_id: u32);
    /// Detach and drop an element.
    fn destroy(&mut self, id: OverlayId);
    /// Reorder elements bottom-to-top.
    fn restack(&mut self, order: &[OverlayId]);
    /// Show, hide or move the cursor preview.
    fn present_preview(&mut self, preview: &CursorPreview);
    /// Show (`Some`) or hide (`None`) the rubber-band rectangle.
    fn present_selection_box(&mut self, rect: Option<&Bounds>);
    /// Number of live object overlays.
    fn live_count(&self) -> usize;
}

/// State of one element in a [`HeadlessOverlays`] host.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessElement {
    pub frame: OverlayFrame,
    pub style: OverlayStyle,
    pub interactive: bool,
    pub ref_id: Option<u32>,
}

/// In-memory overlay host for tests and non-browser hosts.
#[derive(Debug, Default)]
pub struct HeadlessOverlays {
    elements: HashMap<OverlayId, HeadlessElement>,
    order: Vec<OverlayId>,
    preview: CursorPreview,
    selection_box: Option<Bounds>,
}

impl HeadlessOverlays {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: OverlayId) -> Option<&HeadlessElement> {
        self.elements.get(&id)
    }

    /// Element ids bottom-to-top.
    #[must_use]
    pub fn order(&self) -> &[OverlayId] {
        &self.order
    }

    #[must_use]
    pub fn preview(&self) -> &CursorPreview {
        &self.preview
    }

    #[must_use]
    pub fn selection_box(&self) -> Option<&Bounds> {
        self.selection_box.as_ref()
    }
}

impl OverlayHost for HeadlessOverlays {
    fn create(&mut self, id: OverlayId, frame: &OverlayFrame, interactive: bool) {
        self.elements.insert(
            id,
            HeadlessElement { frame: *frame, style: OverlayStyle::Idle, interactive, ref_id: None },
        );
        self.order.push(id);
    }

    fn reposition(&mut self, id: OverlayId, left: f64, top: f64) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.frame.left = left;
            el.frame.top = top;
        }
    }

    fn rotate(&mut self, id: OverlayId, rotation: f64) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.frame.rotation = rotation;
        }
    }

    fn set_style(&mut self, id: OverlayId, style: OverlayStyle) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.style = style;
        }
    }

    fn set_interactive(&mut self, id: OverlayId, interactive: bool) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.interactive = interactive;
        }
    }

    fn set_ref_id(&mut self, id: OverlayId, ref_id: u32) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.ref_id = Some(ref_id);
        }
    }

    fn destroy(&mut self, id: OverlayId) {
        self.elements.remove(&id);
        self.order.retain(|o| *o != id);
    }

    fn restack(&mut self, order: &[OverlayId]) {
        self.order = order.iter().copied().filter(|id| self.elements.contains_key(id)).collect();
    }

    fn present_preview(&mut self, preview: &CursorPreview) {
        self.preview = preview.clone();
    }

    fn present_selection_box(&mut self, rect: Option<&Bounds>) {
        self.selection_box = rect.copied();
    }

    fn live_count(&self) -> usize {
        self.elements.len()
    }
}
