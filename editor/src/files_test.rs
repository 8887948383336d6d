use super::*;
use crate::config::{Configuration, MapConfig};
use crate::test_support::{floor, item, sample_config};

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("floormap-{}-{name}", uuid::Uuid::new_v4()))
}

#[test]
fn pretty_json_uses_four_space_indent() {
    let text = to_pretty_json(&serde_json::json!({ "a": { "b": 1 } })).unwrap();
    assert_eq!(text, "{\n    \"a\": {\n        \"b\": 1\n    }\n}");
}

#[tokio::test]
async fn save_then_load_configuration() {
    let path = temp_path("config.json");
    let cfg = sample_config();
    save_json_file(&path, &cfg).await.unwrap();

    let text = read_json_text(&path).await.unwrap();
    assert!(text.starts_with("{\n    \"assets\""));

    let back: Configuration = load_json_file(&path).await.unwrap();
    assert_eq!(back, cfg);
    tokio::fs::remove_file(&path).await.unwrap();
}

#[tokio::test]
async fn load_reports_bad_json() {
    let path = temp_path("broken.json");
    tokio::fs::write(&path, "{ \"id\": ").await.unwrap();
    let err = load_json_file::<MapConfig>(&path).await.unwrap_err();
    assert!(matches!(err, FileError::Json(_)));
    tokio::fs::remove_file(&path).await.unwrap();
}

#[tokio::test]
async fn load_reports_missing_file() {
    let err = load_json_file::<MapConfig>(temp_path("absent.json")).await.unwrap_err();
    assert!(matches!(err, FileError::Io(_)));
}

#[tokio::test]
async fn single_floor_documents_round_trip() {
    let path = temp_path("floor.json");
    let map = floor(9, vec![item("desk", 1.0, 2.0, -45.0)]);
    save_json_file(&path, &map).await.unwrap();
    let back: MapConfig = load_json_file(&path).await.unwrap();
    assert_eq!(back, map);
    tokio::fs::remove_file(&path).await.unwrap();
}
