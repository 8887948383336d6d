use serde_json::json;

use super::*;
use crate::test_support::{floor, item, sample_config};

// =============================================================
// Serde shape
// =============================================================

#[test]
fn map_config_uses_camel_case_and_skips_absent_optionals() {
    let map = floor(3, vec![item("desk", 10.0, 20.0, -45.0)]);
    let value = serde_json::to_value(&map).unwrap();
    assert_eq!(value["backgroundImage"], "floor.png");
    assert_eq!(value["renderedImage"], "");
    assert!(value.get("mapWidth").is_none());
    assert!(value.get("mapHeight").is_none());
    let it = &value["items"][0];
    assert_eq!(it["type"], "desk");
    assert_eq!(it["z"], 0);
    assert!(it.get("name").is_none());
    assert!(it.get("options").is_none());
}

#[test]
fn map_config_parses_existing_export() {
    let raw = json!({
        "id": 4,
        "icon": "f4.png",
        "backgroundImage": "floor.png",
        "renderedImage": "data:image/png;base64,AAAA",
        "mapWidth": 800,
        "mapHeight": 600,
        "items": [
            { "x": 10, "y": 12, "z": 0, "rotation": -90, "type": "desk", "name": "A-12", "options": { "sensor": 7 } },
            { "x": 1.5, "y": 2, "z": 0, "rotation": 0, "type": "chair" }
        ]
    });
    let map: MapConfig = serde_json::from_value(raw).unwrap();
    assert_eq!(map.map_width, Some(800));
    assert_eq!(map.items.len(), 2);
    assert_eq!(map.items[0].name.as_deref(), Some("A-12"));
    assert_eq!(map.items[0].options, Some(json!({ "sensor": 7 })));
    assert!((map.items[1].x - 1.5).abs() < f64::EPSILON);
}

#[test]
fn configuration_round_trips_through_json() {
    let cfg = sample_config();
    let text = serde_json::to_string(&cfg).unwrap();
    assert!(text.contains("\"mapObjectTypes\""));
    assert!(text.contains("\"editorSettings\""));
    assert!(text.contains("\"snapToGrid\""));
    let back: Configuration = serde_json::from_str(&text).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn toolbar_header_omits_type() {
    let header = ToolbarItemSettings { caption: "Furniture".into(), icon: "f.png".into(), kind: None, items: Some(vec![]) };
    let value = serde_json::to_value(&header).unwrap();
    assert!(value.get("type").is_none());
    assert!(value["items"].is_array());
}

// =============================================================
// Validation
// =============================================================

#[test]
fn sample_config_is_valid() {
    assert!(validate(&sample_config()).is_empty());
}

#[test]
fn validation_reports_each_problem() {
    let mut cfg = sample_config();
    cfg.map_object_types.push("desk".into());
    cfg.map_objects[1].image = "missing.png".into();
    cfg.floor_maps[1].id = 1;
    cfg.floor_maps[0].items.push(item("sofa", 0.0, 0.0, 0.0));
    cfg.editor_settings.current_floor_map = 9;

    let errors = validate(&cfg);
    assert!(errors.contains(&ConfigError::DuplicateObjectType("desk".into())));
    assert!(errors.contains(&ConfigError::MissingObjectImage { kind: "chair".into(), image: "missing.png".into() }));
    assert!(errors.contains(&ConfigError::DuplicateFloor(1)));
    assert!(errors.contains(&ConfigError::UnknownItemType { floor: 1, kind: "sofa".into() }));
    assert!(errors.contains(&ConfigError::UnknownCurrentFloor(9)));
}

#[test]
fn validation_requires_object_types_and_backgrounds() {
    let mut cfg = sample_config();
    cfg.map_object_types.clear();
    cfg.floor_maps[0].background_image = "nope.png".into();
    let errors = validate(&cfg);
    assert!(errors.contains(&ConfigError::NoObjectTypes));
    assert!(errors.contains(&ConfigError::UndeclaredObjectType("desk".into())));
    assert!(errors.contains(&ConfigError::MissingBackground { floor: 1, image: "nope.png".into() }));
}

// =============================================================
// ConfigService
// =============================================================

#[test]
fn service_accepts_valid_config_and_bumps_revision() {
    let mut svc = ConfigService::new();
    let rx = svc.subscribe();
    assert_eq!(svc.revision(), 0);

    let msg = svc.set_config(sample_config());
    assert!(msg.is_empty(), "{msg}");
    assert_eq!(svc.revision(), 1);
    assert_eq!(*rx.borrow(), 1);
    assert_eq!(svc.object_types(), &["desk".to_string(), "chair".to_string()]);
    assert_eq!(svc.map_objects().len(), 2);
    assert_eq!(svc.floor_maps().len(), 2);
    assert_eq!(svc.editor_settings().current_floor_map, 1);
    assert_eq!(svc.floor_map(2).unwrap().items.len(), 1);
    assert!(svc.floor_map(7).is_none());
}

#[test]
fn service_rejection_returns_message_and_keeps_state() {
    let mut svc = ConfigService::new();
    assert!(svc.set_config(sample_config()).is_empty());

    let mut bad = sample_config();
    bad.editor_settings.current_floor_map = 42;
    let msg = svc.set_config(bad);
    assert_eq!(msg, "current floor map 42 does not exist");
    assert_eq!(svc.editor_settings().current_floor_map, 1);
    assert_eq!(svc.revision(), 1);
}

#[test]
fn service_joins_multiple_messages_with_newlines() {
    let mut svc = ConfigService::new();
    let mut bad = sample_config();
    bad.map_object_types.clear();
    let msg = svc.set_config(bad);
    assert!(msg.lines().count() >= 2, "{msg}");
}

#[test]
fn set_floor_maps_validates_against_current_config() {
    let mut svc = ConfigService::new();
    assert!(svc.set_config(sample_config()).is_empty());

    let mut floors = svc.floor_maps().to_vec();
    floors[0].items.push(item("desk", 5.0, 5.0, 0.0));
    assert!(svc.set_floor_maps(floors).is_empty());
    assert_eq!(svc.floor_map(1).unwrap().items.len(), 3);

    let mut floors = svc.floor_maps().to_vec();
    floors[0].items.push(item("lamp", 5.0, 5.0, 0.0));
    assert!(!svc.set_floor_maps(floors).is_empty());
    assert_eq!(svc.floor_map(1).unwrap().items.len(), 3);
}

#[test]
fn set_editor_settings_rejects_unknown_floor() {
    let mut svc = ConfigService::new();
    assert!(svc.set_config(sample_config()).is_empty());

    let mut settings = svc.editor_settings().clone();
    settings.current_floor_map = 2;
    settings.show_grid = false;
    assert!(svc.set_editor_settings(settings.clone()).is_empty());
    assert!(!svc.editor_settings().show_grid);

    settings.current_floor_map = 99;
    assert!(!svc.set_editor_settings(settings).is_empty());
    assert_eq!(svc.editor_settings().current_floor_map, 2);
}
