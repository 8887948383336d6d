//! Object catalog: resolves an object type to its template and image.
//!
//! DESIGN
//! ======
//! A rebuild decodes every configured object image in parallel and swaps the
//! whole catalog in once all loads have settled, so callers never see a
//! half-built catalog. A type whose image fails to load is logged and left
//! out; the rest of the catalog is still published and the ready revision is
//! bumped either way.
//!
//! Templates are handed out by value: [`Catalog::get`] returns a fresh copy
//! that the engine may position and rotate freely.

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;

use std::collections::HashMap;

use futures::future::join_all;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::assets::{self, AssetError, AssetStore, ImageHandle};
use crate::config::MapObjectConfig;
use crate::model::PlacedObject;

#[derive(Debug, Clone)]
struct CatalogEntry {
    template: PlacedObject,
    image: ImageHandle,
}

/// Outcome of a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildSummary {
    pub loaded: usize,
    pub failed: usize,
}

/// Type → template/image registry.
pub struct Catalog {
    entries: HashMap<String, CatalogEntry>,
    order: Vec<String>,
    ready: watch::Sender<u64>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        let (ready, _) = watch::channel(0);
        Self { entries: HashMap::new(), order: Vec::new(), ready }
    }

    /// Reload every object type from `objects`, resolving images in `assets`.
    pub async fn rebuild(&mut self, objects: &[MapObjectConfig], assets: &AssetStore) -> RebuildSummary {
        debug!(types = objects.len(), "catalog rebuild started");
        let loads = objects.iter().map(|obj| async move {
            match assets.get_object(&obj.image) {
                Some(data) => assets::load_image(data).await,
                None => Err(AssetError::Missing(obj.image.clone())),
            }
        });
        let results = join_all(loads).await;

        let mut entries = HashMap::new();
        let mut order = Vec::new();
        let mut failed = 0;
        for (obj, result) in objects.iter().zip(results) {
            match result {
                Ok(image) => {
                    let template = PlacedObject::template(obj.kind.clone(), image.width(), image.height());
                    if entries.insert(obj.kind.clone(), CatalogEntry { template, image }).is_none() {
                        order.push(obj.kind.clone());
                    }
                }
                Err(e) => {
                    failed += 1;
                    error!(kind = %obj.kind, image = %obj.image, error = %e, "object image failed to load");
                }
            }
        }

        self.entries = entries;
        self.order = order;
        self.ready.send_modify(|r| *r += 1);

        let summary = RebuildSummary { loaded: self.order.len(), failed };
        info!(loaded = summary.loaded, failed = summary.failed, "catalog ready");
        summary
    }

    /// Fresh copy of the template for `kind`.
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<PlacedObject> {
        self.entries.get(kind).map(|e| e.template.clone())
    }

    /// Decoded image for `kind`.
    #[must_use]
    pub fn image(&self, kind: &str) -> Option<&ImageHandle> {
        self.entries.get(kind).map(|e| &e.image)
    }

    /// Fresh copies of all templates in configuration order.
    #[must_use]
    pub fn objects(&self) -> Vec<PlacedObject> {
        self.order.iter().filter_map(|k| self.get(k)).collect()
    }

    /// Loaded type names in configuration order.
    #[must_use]
    pub fn kinds(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    /// Subscribe to rebuild completions. The value counts finished rebuilds.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.ready.subscribe()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.ready.borrow()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
