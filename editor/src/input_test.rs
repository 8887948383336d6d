use super::*;

fn key(code: &str) -> Key {
    Key::new(code)
}

// =============================================================
// Modifiers
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift && !m.ctrl && !m.alt && !m.meta);
    assert_eq!(m.prefix(), "");
}

#[test]
fn prefix_orders_ctrl_alt_shift() {
    let m = Modifiers { shift: true, ctrl: true, alt: true, meta: true };
    assert_eq!(m.prefix(), "Ctrl+Alt+Shift+");
    assert_eq!(Modifiers::ctrl().prefix(), "Ctrl+");
}

// =============================================================
// Shortcuts
// =============================================================

#[test]
fn shortcut_table() {
    let none = Modifiers::default();
    assert_eq!(Shortcut::from_key(&key("KeyZ"), Modifiers::ctrl()), Some(Shortcut::Undo));
    assert_eq!(Shortcut::from_key(&key("KeyR"), none), Some(Shortcut::Rotate));
    assert_eq!(Shortcut::from_key(&key("Delete"), none), Some(Shortcut::Delete));
    assert_eq!(Shortcut::from_key(&key("KeyG"), none), Some(Shortcut::ToggleGrid));
    assert_eq!(Shortcut::from_key(&key("BracketLeft"), none), Some(Shortcut::BringToBottom));
    assert_eq!(Shortcut::from_key(&key("BracketRight"), none), Some(Shortcut::BringToTop));
}

#[test]
fn shortcuts_match_modifiers_exactly() {
    assert_eq!(Shortcut::from_key(&key("KeyZ"), Modifiers::default()), None);
    assert_eq!(Shortcut::from_key(&key("KeyR"), Modifiers::ctrl()), None);
    let shift = Modifiers { shift: true, ..Modifiers::default() };
    assert_eq!(Shortcut::from_key(&key("KeyG"), shift), None);
    assert_eq!(Shortcut::from_key(&key("KeyQ"), Modifiers::default()), None);
}

#[test]
fn meta_is_not_part_of_shortcut_names() {
    let meta = Modifiers { meta: true, ..Modifiers::default() };
    assert_eq!(key("KeyR").shortcut_name(meta), "KeyR");
}

// =============================================================
// Keys
// =============================================================

#[test]
fn arrow_nudges() {
    let none = Modifiers::default();
    assert_eq!(key("ArrowLeft").nudge(none), Some((-1.0, 0.0)));
    assert_eq!(key("ArrowRight").nudge(none), Some((1.0, 0.0)));
    assert_eq!(key("ArrowUp").nudge(none), Some((0.0, -1.0)));
    assert_eq!(key("ArrowDown").nudge(Modifiers::ctrl()), Some((0.0, 10.0)));
    assert_eq!(key("KeyA").nudge(none), None);
}

#[test]
fn selection_modifier_is_left_control_only() {
    assert!(key("ControlLeft").is_selection_modifier());
    assert!(!key("ControlRight").is_selection_modifier());
    assert_eq!(key("ControlLeft").code(), "ControlLeft");
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    let s = InputState::default();
    assert!(!s.is_drag_selecting());
    assert!(s.selection_rect().is_none());
}

#[test]
fn drag_selecting_exposes_rect() {
    let rect = Bounds::new(1.0, 5.0, 6.0, 2.0);
    let s = InputState::DragSelecting { start: Point::new(2.0, 1.0), rect: Some(rect), scanning: true };
    assert!(s.is_drag_selecting());
    assert_eq!(s.selection_rect(), Some(rect));
}

#[test]
fn editor_mode_default_is_idle() {
    assert_eq!(EditorMode::default(), EditorMode::Idle);
}
