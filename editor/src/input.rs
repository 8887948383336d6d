//! Input model: editor modes, modifier keys, mouse buttons, key codes,
//! shortcuts and the drag-selection gesture.
//!
//! Keys are identified by their physical code as a browser reports it in
//! `KeyboardEvent.code` (`"KeyZ"`, `"BracketLeft"`, `"ControlLeft"`). Shortcut
//! matching builds the modifier-prefixed name (`"Ctrl+KeyZ"`) and compares it
//! exactly, so `Shift+KeyR` is not a rotate.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::consts::{NUDGE_STEP_FAST_PX, NUDGE_STEP_PX, SELECTION_MODIFIER_CODE};
use crate::geometry::{Bounds, Point};

/// Observable mode of the editor, derived from its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    /// No object type is active.
    #[default]
    Idle,
    /// An object type is active; clicks place it.
    Placing,
    /// The selection modifier is held or a selection exists; clicks select.
    Selecting,
    /// All mutation is suppressed.
    ReadOnly,
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Only Ctrl held.
    #[must_use]
    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::default() }
    }

    /// `"Ctrl+"`, `"Alt+"`, `"Shift+"` in that order for each held modifier.
    #[must_use]
    pub fn prefix(&self) -> String {
        let mut out = String::new();
        if self.ctrl {
            out.push_str("Ctrl+");
        }
        if self.alt {
            out.push_str("Alt+");
        }
        if self.shift {
            out.push_str("Shift+");
        }
        out
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

/// A physical key code (e.g. `"Delete"`, `"KeyG"`, `"ArrowLeft"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Whether this is the key that holds the editor in selection mode.
    #[must_use]
    pub fn is_selection_modifier(&self) -> bool {
        self.0 == SELECTION_MODIFIER_CODE
    }

    /// Modifier-prefixed shortcut name, e.g. `"Ctrl+KeyZ"`.
    #[must_use]
    pub fn shortcut_name(&self, mods: Modifiers) -> String {
        format!("{}{}", mods.prefix(), self.0)
    }

    /// Nudge delta for an arrow key: 1px, or 10px with Ctrl held.
    #[must_use]
    pub fn nudge(&self, mods: Modifiers) -> Option<(f64, f64)> {
        let step = if mods.ctrl { NUDGE_STEP_FAST_PX } else { NUDGE_STEP_PX };
        match self.0.as_str() {
            "ArrowLeft" => Some((-step, 0.0)),
            "ArrowRight" => Some((step, 0.0)),
            "ArrowUp" => Some((0.0, -step)),
            "ArrowDown" => Some((0.0, step)),
            _ => None,
        }
    }
}

/// Editor commands bound to key releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// `Ctrl+KeyZ`
    Undo,
    /// `KeyR`
    Rotate,
    /// `Delete`
    Delete,
    /// `KeyG`
    ToggleGrid,
    /// `BracketLeft`
    BringToBottom,
    /// `BracketRight`
    BringToTop,
}

impl Shortcut {
    /// Match a released key against the shortcut table.
    #[must_use]
    pub fn from_key(key: &Key, mods: Modifiers) -> Option<Self> {
        match key.shortcut_name(mods).as_str() {
            "Ctrl+KeyZ" => Some(Self::Undo),
            "KeyR" => Some(Self::Rotate),
            "Delete" => Some(Self::Delete),
            "KeyG" => Some(Self::ToggleGrid),
            "BracketLeft" => Some(Self::BringToBottom),
            "BracketRight" => Some(Self::BringToTop),
            _ => None,
        }
    }
}

/// Pointer gesture tracked between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    #[default]
    Idle,
    /// Rubber-band selection in progress.
    DragSelecting {
        /// Canvas position of the pointer-down.
        start: Point,
        /// Current rectangle; `None` until the pointer moves.
        rect: Option<Bounds>,
        /// Whether the periodic overlap scan is running.
        scanning: bool,
    },
}

impl InputState {
    /// Current rubber-band rectangle, if any.
    #[must_use]
    pub fn selection_rect(&self) -> Option<Bounds> {
        match self {
            Self::DragSelecting { rect, .. } => *rect,
            Self::Idle => None,
        }
    }

    #[must_use]
    pub fn is_drag_selecting(&self) -> bool {
        matches!(self, Self::DragSelecting { .. })
    }
}
