//! Floor-map editing engine.
//!
//! A host (browser page or headless tool) loads a configuration of object
//! types, image assets and floors, then drives [`engine::EngineCore`] with
//! pointer and keyboard events. The engine places typed objects on a floor
//! background, selects and moves them, keeps undo history and serializes the
//! scene back into a floor document. Drawing goes through a
//! [`render::Surface`]; per-object interactive handles go through an
//! [`overlay::OverlayHost`]. Both have in-memory implementations, and the
//! `web` feature adds canvas/DOM ones.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Configuration apply, roles, floor switching, import/export |
//! | [`engine`] | Editing state machine and host [`engine::Action`]s |
//! | [`config`] | Persisted JSON model and validating configuration service |
//! | [`assets`] | Named base64 assets and image decoding |
//! | [`catalog`] | Object type templates and their images |
//! | [`layers`] | Ordered stack of placed objects |
//! | [`history`] | Bounded edit log driving undo |
//! | [`model`] | Placed object type |
//! | [`overlay`] | Interactive handles, cursor preview, selection box |
//! | [`render`] | Surface trait, software surface, scene redraw |
//! | [`input`] | Modes, modifiers, key codes, gesture state |
//! | [`geometry`] | Snapping, rotation, point-in-rectangle tests |
//! | [`files`] | Pretty JSON file load/save (native hosts) |
//! | [`consts`] | Shared numeric constants |
//! | `web` | Browser surface, overlay host and input bindings (feature `web`) |

pub mod assets;
pub mod catalog;
pub mod config;
pub mod consts;
pub mod engine;
#[cfg(not(target_arch = "wasm32"))]
pub mod files;
pub mod geometry;
pub mod history;
pub mod input;
pub mod layers;
pub mod model;
pub mod overlay;
pub mod render;
pub mod session;
#[cfg(feature = "web")]
pub mod web;

#[cfg(test)]
pub(crate) mod test_support;
