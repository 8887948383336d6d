//! Layer stack: the ordered list of placed objects.
//!
//! Draw order is list order, bottom first. `z` on the objects is not
//! consulted. The stack assigns two identifiers on insertion:
//!
//! - `id = len + 100`, kept for compatibility with saved overlays and
//!   external lookups. It can repeat after removals, so lookups and removals
//!   by id scan from the end and the most recently added match wins.
//! - [`ObjectKey`], a never-reused counter used for identity everywhere
//!   inside the engine.
//!
//! The stack never touches overlays beyond tagging them with their layer id;
//! restacking the host is the caller's job.

#[cfg(test)]
#[path = "layers_test.rs"]
mod layers_test;

use crate::consts::LAYER_ID_BASE;
use crate::model::{ObjectKey, PlacedObject};

/// Ordered collection of placed objects.
#[derive(Debug)]
pub struct LayerStack {
    objects: Vec<PlacedObject>,
    next_key: u64,
}

impl LayerStack {
    #[must_use]
    pub fn new() -> Self {
        Self { objects: Vec::new(), next_key: 1 }
    }

    /// Append `obj`, assigning its layer id and key. Returns the key.
    pub fn add(&mut self, mut obj: PlacedObject) -> ObjectKey {
        let id = u32::try_from(self.objects.len()).unwrap_or(u32::MAX).saturating_add(LAYER_ID_BASE);
        let key = ObjectKey(self.next_key);
        self.next_key += 1;

        obj.id = Some(id);
        obj.key = key;
        if let Some(overlay) = obj.overlay.as_mut() {
            overlay.set_ref_id(id);
        }
        self.objects.push(obj);
        key
    }

    /// Remove the last object carrying layer id `id`.
    pub fn remove(&mut self, id: u32) -> Option<PlacedObject> {
        let idx = self.objects.iter().rposition(|o| o.id == Some(id))?;
        Some(self.objects.remove(idx))
    }

    /// Remove the topmost object. Until the order is changed with
    /// `bring_to_top`/`bring_to_bottom` this is the most recently added one.
    pub fn remove_last_added(&mut self) -> Option<PlacedObject> {
        self.objects.pop()
    }

    /// Remove a specific object instance.
    pub fn remove_object(&mut self, key: ObjectKey) -> Option<PlacedObject> {
        let idx = self.position(key)?;
        Some(self.objects.remove(idx))
    }

    /// Last object carrying layer id `id`.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&PlacedObject> {
        self.objects.iter().rev().find(|o| o.id == Some(id))
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut PlacedObject> {
        self.objects.iter_mut().rev().find(|o| o.id == Some(id))
    }

    #[must_use]
    pub fn find(&self, key: ObjectKey) -> Option<&PlacedObject> {
        self.objects.iter().find(|o| o.key == key)
    }

    pub fn find_mut(&mut self, key: ObjectKey) -> Option<&mut PlacedObject> {
        self.objects.iter_mut().find(|o| o.key == key)
    }

    #[must_use]
    pub fn contains(&self, key: ObjectKey) -> bool {
        self.position(key).is_some()
    }

    /// Drop every object and return them in draw order.
    pub fn clear(&mut self) -> Vec<PlacedObject> {
        std::mem::take(&mut self.objects)
    }

    /// Move an object to the end of the order. Returns false if absent.
    pub fn bring_to_top(&mut self, key: ObjectKey) -> bool {
        let Some(idx) = self.position(key) else {
            return false;
        };
        if idx + 1 != self.objects.len() {
            let obj = self.objects.remove(idx);
            self.objects.push(obj);
        }
        true
    }

    /// Move an object to the start of the order. Returns false if absent.
    pub fn bring_to_bottom(&mut self, key: ObjectKey) -> bool {
        let Some(idx) = self.position(key) else {
            return false;
        };
        if idx != 0 {
            let obj = self.objects.remove(idx);
            self.objects.insert(0, obj);
        }
        true
    }

    /// Objects bottom to top.
    #[must_use]
    pub fn objects(&self) -> &[PlacedObject] {
        &self.objects
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlacedObject> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, PlacedObject> {
        self.objects.iter_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn position(&self, key: ObjectKey) -> Option<usize> {
        self.objects.iter().position(|o| o.key == key)
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new()
    }
}
