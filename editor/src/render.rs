//! Rendering: redraws the whole scene onto a [`Surface`].
//!
//! Every redraw runs the same pass: fill white, paint the background image
//! at the origin, stroke the grid if shown, then draw every layer bottom to
//! top. Objects are drawn canvas-style: translate to the object center,
//! rotate by the negated object rotation, draw the image at its decentered
//! offset.
//!
//! [`RasterSurface`] is the in-memory software surface used headlessly and in
//! tests; the `web` feature adds a canvas-backed surface.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use tracing::trace;

use crate::assets::ImageHandle;
use crate::catalog::Catalog;
use crate::consts::{CANVAS_FILL, GRID_STROKE};
use crate::geometry::{self, Point};
use crate::layers::LayerStack;
use crate::model::PlacedObject;

/// Default surface size before a background is loaded (matches a fresh HTML canvas).
pub const DEFAULT_SURFACE_SIZE: (u32, u32) = (300, 150);

/// Failure while drawing or exporting a surface.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("png encode failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("canvas call failed: {0}")]
    Canvas(String),
}

/// A 2D drawing target.
pub trait Surface {
    /// Current size in pixels.
    fn size(&self) -> (u32, u32);

    /// Resize the surface. Contents are discarded.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backing surface cannot be resized.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError>;

    /// Paint the whole surface with `color`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backing surface rejects the call.
    fn fill(&mut self, color: Rgba<u8>) -> Result<(), RenderError>;

    /// Draw `image` with its top-left corner at `offset` in a coordinate
    /// system translated to `origin` and rotated by `-rotation_deg`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backing surface rejects the call.
    fn draw_image(&mut self, image: &ImageHandle, origin: Point, offset: Point, rotation_deg: f64) -> Result<(), RenderError>;

    /// Stroke 1px grid lines at every positive multiple of `cell` inside the surface.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backing surface rejects the call.
    fn draw_grid(&mut self, cell: u32, color: Rgba<u8>) -> Result<(), RenderError>;

    /// Export the current pixels as a `data:image/png;base64,` URL.
    ///
    /// # Errors
    ///
    /// Returns `Err` if encoding fails.
    fn to_png_data_url(&self) -> Result<String, RenderError>;
}

/// Read-only view of everything a redraw needs.
pub struct Scene<'a> {
    pub background: Option<&'a ImageHandle>,
    /// Grid cell size when the grid is shown.
    pub grid: Option<u32>,
    pub layers: &'a LayerStack,
    pub catalog: &'a Catalog,
}

/// Redraw the full scene.
///
/// # Errors
///
/// Returns `Err` if any surface call fails.
pub fn draw(surface: &mut dyn Surface, scene: &Scene<'_>) -> Result<(), RenderError> {
    clean(surface, scene.background, scene.grid)?;

    for obj in scene.layers.iter() {
        draw_object(surface, obj, scene.catalog)?;
    }
    Ok(())
}

/// Draw one object over the current contents.
///
/// # Errors
///
/// Returns `Err` if the surface call fails.
pub fn draw_object(surface: &mut dyn Surface, obj: &PlacedObject, catalog: &Catalog) -> Result<(), RenderError> {
    let Some(image) = catalog.image(&obj.kind) else {
        trace!(kind = %obj.kind, "no image for object type; skipped");
        return Ok(());
    };
    let offset = geometry::top_left(Point::default(), obj.width(), obj.height());
    surface.draw_image(image, obj.center(), offset, obj.rotation)
}

/// Fill, background and grid; no layers.
///
/// # Errors
///
/// Returns `Err` if any surface call fails.
pub fn clean(surface: &mut dyn Surface, background: Option<&ImageHandle>, grid: Option<u32>) -> Result<(), RenderError> {
    surface.fill(CANVAS_FILL)?;
    if let Some(bg) = background {
        surface.draw_image(bg, Point::default(), Point::default(), 0.0)?;
    }
    if let Some(cell) = grid {
        surface.draw_grid(cell, GRID_STROKE)?;
    }
    Ok(())
}

/// Encode RGBA pixels as a PNG data URL.
///
/// # Errors
///
/// Returns `Err` if PNG encoding fails.
pub fn encode_png_data_url(image: &RgbaImage) -> Result<String, RenderError> {
    let mut bytes = Cursor::new(Vec::new());
    PngEncoder::new(&mut bytes).write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgba8)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(bytes.into_inner())))
}

// =============================================================================
// RASTER SURFACE
// =============================================================================

/// Software RGBA surface with nearest-neighbour sampling and source-over blending.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixels: RgbaImage,
}

impl RasterSurface {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { pixels: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0])) }
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        (x < self.pixels.width() && y < self.pixels.height()).then(|| *self.pixels.get_pixel(x, y))
    }

    fn blend(&mut self, x: u32, y: u32, src: Rgba<u8>) {
        let dst = self.pixels.get_pixel_mut(x, y);
        *dst = source_over(src, *dst);
    }
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new(DEFAULT_SURFACE_SIZE.0, DEFAULT_SURFACE_SIZE.1)
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.pixels = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        Ok(())
    }

    fn fill(&mut self, color: Rgba<u8>) -> Result<(), RenderError> {
        for px in self.pixels.pixels_mut() {
            *px = color;
        }
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn draw_image(&mut self, image: &ImageHandle, origin: Point, offset: Point, rotation_deg: f64) -> Result<(), RenderError> {
        let (dw, dh) = self.size();
        if image.width() == 0 || image.height() == 0 || dw == 0 || dh == 0 {
            return Ok(());
        }
        let (sw, sh) = (f64::from(image.width()), f64::from(image.height()));

        // Forward map of the image corners gives the destination bounding box.
        let to_world = |local: Point| {
            let p = Point::new(origin.x + local.x, origin.y + local.y);
            geometry::rotate(p, origin, rotation_deg)
        };
        let quad = [
            to_world(offset),
            to_world(Point::new(offset.x + sw, offset.y)),
            to_world(Point::new(offset.x + sw, offset.y + sh)),
            to_world(Point::new(offset.x, offset.y + sh)),
        ];
        let min_x = quad.iter().map(|p| p.x).fold(f64::MAX, f64::min).floor().max(0.0);
        let min_y = quad.iter().map(|p| p.y).fold(f64::MAX, f64::min).floor().max(0.0);
        let max_x = quad.iter().map(|p| p.x).fold(f64::MIN, f64::max).ceil().min(f64::from(dw));
        let max_y = quad.iter().map(|p| p.y).fold(f64::MIN, f64::max).ceil().min(f64::from(dh));
        if min_x >= max_x || min_y >= max_y {
            return Ok(());
        }

        let src = image.pixels();
        for y in (min_y as u32)..(max_y as u32) {
            for x in (min_x as u32)..(max_x as u32) {
                // Inverse map the pixel center back into image space.
                let world = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let local = geometry::rotate(world, origin, -rotation_deg);
                let sx = (local.x - origin.x - offset.x).floor();
                let sy = (local.y - origin.y - offset.y).floor();
                if sx < 0.0 || sy < 0.0 || sx >= sw || sy >= sh {
                    continue;
                }
                let texel = *src.get_pixel(sx as u32, sy as u32);
                self.blend(x, y, texel);
            }
        }
        Ok(())
    }

    fn draw_grid(&mut self, cell: u32, color: Rgba<u8>) -> Result<(), RenderError> {
        if cell == 0 {
            return Ok(());
        }
        let (w, h) = self.size();
        for x in (cell..w).step_by(cell as usize) {
            for y in 0..h {
                self.blend(x, y, color);
            }
        }
        for y in (cell..h).step_by(cell as usize) {
            for x in 0..w {
                self.blend(x, y, color);
            }
        }
        Ok(())
    }

    fn to_png_data_url(&self) -> Result<String, RenderError> {
        encode_png_data_url(&self.pixels)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn source_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = f64::from(src[3]) / 255.0;
    if sa >= 1.0 {
        return src;
    }
    if sa <= 0.0 {
        return dst;
    }
    let da = f64::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let channel = |i: usize| {
        let c = (f64::from(src[i]) * sa + f64::from(dst[i]) * da * (1.0 - sa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    Rgba([channel(0), channel(1), channel(2), (out_a * 255.0).round().clamp(0.0, 255.0) as u8])
}
