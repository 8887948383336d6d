//! Placed map objects.
//!
//! A [`PlacedObject`] starts life as a catalog template (zero position, no
//! id, no overlay), is stamped with a position and rotation by the engine,
//! and receives its layer id and key when pushed onto the layer stack.
//! Width and height are the template's un-rotated image size and never change;
//! rotation is applied only when drawing and hit-testing.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use crate::config::MapItem;
use crate::geometry::{Point, RotatedRect};
use crate::overlay::OverlayHandle;

/// Identity of a placed object. Assigned once by the layer stack and never
/// reused, unlike the layer id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectKey(pub u64);

/// One object instance on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedObject {
    /// Layer id (`stack length + 100` at insertion); `None` until placed.
    pub id: Option<u32>,
    pub(crate) key: ObjectKey,
    /// Center x in canvas pixels.
    pub x: f64,
    /// Center y in canvas pixels.
    pub y: f64,
    /// Declared for the persisted format; draw order is stack order.
    pub z: f64,
    /// Degrees, clockwise-positive. Any real value; meaning is mod 360.
    pub rotation: f64,
    /// Catalog type.
    pub kind: String,
    width: u32,
    height: u32,
    pub is_selected: bool,
    /// Optional label carried from the persisted item.
    pub name: Option<String>,
    /// Optional per-item options carried from the persisted item.
    pub options: Option<serde_json::Value>,
    pub(crate) overlay: Option<OverlayHandle>,
}

impl PlacedObject {
    /// A zero-positioned template of `kind` with the given natural size.
    #[must_use]
    pub fn template(kind: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: None,
            key: ObjectKey::default(),
            x: 0.0,
            y: 0.0,
            z: 0.0,
            rotation: 0.0,
            kind: kind.into(),
            width,
            height,
            is_selected: false,
            name: None,
            options: None,
            overlay: None,
        }
    }

    #[must_use]
    pub fn key(&self) -> ObjectKey {
        self.key
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Geometry used for drawing and hit-testing.
    #[must_use]
    pub fn rect(&self) -> RotatedRect {
        RotatedRect { center: self.center(), width: self.width, height: self.height, rotation: self.rotation }
    }

    /// The engine-owned interactive handle, present while the object is placed.
    #[must_use]
    pub fn overlay(&self) -> Option<&OverlayHandle> {
        self.overlay.as_ref()
    }

    /// Persisted form. `z` is always written as 0.
    #[must_use]
    pub fn to_map_item(&self) -> MapItem {
        MapItem {
            x: self.x,
            y: self.y,
            z: 0,
            rotation: self.rotation,
            kind: self.kind.clone(),
            name: self.name.clone(),
            options: self.options.clone(),
        }
    }
}
