//! Shared numeric constants for the editor crate.

use image::Rgba;

// ── Grid ────────────────────────────────────────────────────────

/// Default grid cell size in pixels.
pub const DEFAULT_GRID_SIZE: u32 = 4;

/// Grid line color (black at 5% opacity).
pub const GRID_STROKE: Rgba<u8> = Rgba([0, 0, 0, 13]);

/// Fill painted under the background image on every redraw.
pub const CANVAS_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

// ── Rotation ────────────────────────────────────────────────────

/// Step applied by a single rotate command, in degrees.
pub const ROTATION_STEP_DEG: f64 = 45.0;

/// Lower bound of the working rotation before it wraps back by a full turn.
pub const ROTATION_WRAP_DEG: f64 = -360.0;

// ── Overlays ────────────────────────────────────────────────────

/// Offset of an overlay's outer box from the object's top-left corner.
pub const OVERLAY_OFFSET_PX: f64 = 4.0;

/// Inner padding of an overlay on each side. The overlay's client extent is
/// the object size plus twice this value.
pub const OVERLAY_PADDING_PX: f64 = 3.0;

// ── Selection ───────────────────────────────────────────────────

/// Inset from the right/bottom canvas edge a selection may not cross.
pub const EDITOR_BORDER_PX: f64 = 2.0;

/// Arrow-key nudge step in pixels.
pub const NUDGE_STEP_PX: f64 = 1.0;

/// Arrow-key nudge step with Ctrl held.
pub const NUDGE_STEP_FAST_PX: f64 = 10.0;

/// Period of the rubber-band overlap scan while the pointer is held.
pub const SELECTION_SCAN_PERIOD_MS: u64 = 100;

// ── Layers / history ────────────────────────────────────────────

/// Offset added to the stack length when assigning a layer id.
pub const LAYER_ID_BASE: u32 = 100;

/// Maximum number of retained history entries.
pub const HISTORY_CAPACITY: usize = 1000;

// ── Keys ────────────────────────────────────────────────────────

/// Key code that switches the editor into selection mode while held.
pub const SELECTION_MODIFIER_CODE: &str = "ControlLeft";
