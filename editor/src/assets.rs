//! Asset resolver and image decoding.
//!
//! Assets arrive as base64 strings grouped into `objects`, `icons` and
//! `others`. A payload may carry a `data:<mime>;base64,` header; decoding
//! strips it first. Decoded images are shared, immutable RGBA buffers.

#[cfg(test)]
#[path = "assets_test.rs"]
mod assets_test;

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;

use crate::config::{Asset, AssetsConfig};

/// Failure to resolve or decode an asset.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    Missing(String),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

/// Name-indexed view over the configured asset groups.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    objects: HashMap<String, String>,
    icons: HashMap<String, String>,
    others: HashMap<String, String>,
}

impl AssetStore {
    #[must_use]
    pub fn from_config(assets: &AssetsConfig) -> Self {
        Self { objects: index(&assets.objects), icons: index(&assets.icons), others: index(&assets.others) }
    }

    /// Search objects, then icons, then others.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_object(name).or_else(|| self.get_icon(name)).or_else(|| self.get_other(name))
    }

    #[must_use]
    pub fn get_object(&self, name: &str) -> Option<&str> {
        self.objects.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn get_icon(&self, name: &str) -> Option<&str> {
        self.icons.get(name).map(String::as_str)
    }

    /// Backgrounds and other files.
    #[must_use]
    pub fn get_other(&self, name: &str) -> Option<&str> {
        self.others.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len() + self.icons.len() + self.others.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn index(group: &[Asset]) -> HashMap<String, String> {
    group.iter().map(|a| (a.name.clone(), a.data.clone())).collect()
}

/// A decoded image. Clones share the pixel buffer.
#[derive(Debug, Clone)]
pub struct ImageHandle(Arc<RgbaImage>);

impl ImageHandle {
    #[must_use]
    pub fn new(image: RgbaImage) -> Self {
        Self(Arc::new(image))
    }

    /// Natural width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Natural height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.0
    }

    /// Identity of the shared buffer; equal for clones of one handle.
    #[must_use]
    pub fn key(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Decode a base64 image payload. The work runs on first poll.
pub async fn load_image(data: &str) -> Result<ImageHandle, AssetError> {
    futures::future::lazy(|_| decode_image(data)).await
}

/// Synchronous form of [`load_image`].
pub fn decode_image(data: &str) -> Result<ImageHandle, AssetError> {
    let bytes = STANDARD.decode(strip_data_url(data).trim())?;
    let image = image::load_from_memory(&bytes)?;
    Ok(ImageHandle::new(image.to_rgba8()))
}

/// Drop a leading `data:<mime>;base64,` header, if any.
#[must_use]
pub fn strip_data_url(data: &str) -> &str {
    if data.starts_with("data:") {
        data.split_once(',').map_or(data, |(_, payload)| payload)
    } else {
        data
    }
}
