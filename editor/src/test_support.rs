//! Shared fixtures for unit tests: tiny generated PNG assets and a small
//! two-type configuration.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

use crate::config::{
    Asset, AssetsConfig, Configuration, EditorSettings, MapConfig, MapItem, MapObjectConfig,
};

pub const DESK_SIZE: (u32, u32) = (20, 10);
pub const CHAIR_SIZE: (u32, u32) = (8, 8);
pub const FLOOR_SIZE: (u32, u32) = (200, 100);

pub const DESK_COLOR: Rgba<u8> = Rgba([200, 30, 30, 255]);
pub const CHAIR_COLOR: Rgba<u8> = Rgba([30, 30, 200, 255]);
pub const FLOOR_COLOR: Rgba<u8> = Rgba([240, 240, 240, 255]);

/// Encode a solid `w` x `h` PNG as raw base64.
pub fn png_base64(w: u32, h: u32, color: Rgba<u8>) -> String {
    let img = RgbaImage::from_pixel(w, h, color);
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(img.as_raw(), w, h, ExtendedColorType::Rgba8)
        .unwrap();
    STANDARD.encode(bytes)
}

/// Same as [`png_base64`] with a `data:image/png;base64,` header.
pub fn png_data_url(w: u32, h: u32, color: Rgba<u8>) -> String {
    format!("data:image/png;base64,{}", png_base64(w, h, color))
}

pub fn item(kind: &str, x: f64, y: f64, rotation: f64) -> MapItem {
    MapItem { x, y, z: 0, rotation, kind: kind.into(), name: None, options: None }
}

pub fn floor(id: i64, items: Vec<MapItem>) -> MapConfig {
    MapConfig {
        id,
        icon: "floor-icon.png".into(),
        background_image: "floor.png".into(),
        rendered_image: String::new(),
        map_width: None,
        map_height: None,
        items,
    }
}

/// Valid configuration with `desk` and `chair` types and two floors.
pub fn sample_config() -> Configuration {
    Configuration {
        assets: AssetsConfig {
            objects: vec![
                Asset { name: "desk.png".into(), data: png_data_url(DESK_SIZE.0, DESK_SIZE.1, DESK_COLOR) },
                Asset { name: "chair.png".into(), data: png_base64(CHAIR_SIZE.0, CHAIR_SIZE.1, CHAIR_COLOR) },
            ],
            icons: vec![Asset { name: "desk-icon.png".into(), data: png_base64(2, 2, DESK_COLOR) }],
            others: vec![Asset { name: "floor.png".into(), data: png_data_url(FLOOR_SIZE.0, FLOOR_SIZE.1, FLOOR_COLOR) }],
        },
        map_object_types: vec!["desk".into(), "chair".into()],
        map_objects: vec![
            MapObjectConfig { image: "desk.png".into(), icon: "desk-icon.png".into(), kind: "desk".into() },
            MapObjectConfig { image: "chair.png".into(), icon: "desk-icon.png".into(), kind: "chair".into() },
        ],
        floor_maps: vec![
            floor(1, vec![item("desk", 50.0, 50.0, 0.0), item("chair", 80.0, 30.0, -90.0)]),
            floor(2, vec![item("chair", 20.0, 20.0, 0.0)]),
        ],
        editor_settings: EditorSettings { snap_to_grid: true, show_grid: true, current_floor_map: 1, toolbar: Vec::new() },
    }
}
