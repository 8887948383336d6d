#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

#[test]
fn template_is_zero_positioned_and_unplaced() {
    let t = PlacedObject::template("desk", 20, 10);
    assert_eq!(t.kind, "desk");
    assert_eq!((t.width(), t.height()), (20, 10));
    assert_eq!((t.x, t.y, t.rotation), (0.0, 0.0, 0.0));
    assert!(t.id.is_none());
    assert_eq!(t.key(), ObjectKey::default());
    assert!(t.overlay().is_none());
    assert!(!t.is_selected);
}

#[test]
fn rect_mirrors_center_size_and_rotation() {
    let mut t = PlacedObject::template("desk", 20, 10);
    t.x = 40.0;
    t.y = 30.0;
    t.rotation = -45.0;
    let r = t.rect();
    assert_eq!(r.center, Point::new(40.0, 30.0));
    assert_eq!((r.width, r.height), (20, 10));
    assert_eq!(r.rotation, -45.0);
}

#[test]
fn map_item_writes_zero_z_and_carries_name_and_options() {
    let mut t = PlacedObject::template("desk", 20, 10);
    t.x = 12.0;
    t.y = 34.0;
    t.z = 7.0;
    t.rotation = -90.0;
    t.name = Some("A-1".into());
    t.options = Some(json!({ "seat": 3 }));

    let item = t.to_map_item();
    assert_eq!(item.z, 0);
    assert_eq!((item.x, item.y, item.rotation), (12.0, 34.0, -90.0));
    assert_eq!(item.kind, "desk");
    assert_eq!(item.name.as_deref(), Some("A-1"));
    assert_eq!(item.options, Some(json!({ "seat": 3 })));
}
