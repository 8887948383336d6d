//! JSON file helpers for configuration and single-floor map documents.
//!
//! Documents are written pretty-printed with four-space indentation so
//! exported files diff cleanly against hand-edited ones.

#[cfg(test)]
#[path = "files_test.rs"]
mod files_test;

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::PrettyFormatter;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("file io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize `value` as four-space indented JSON.
///
/// # Errors
///
/// Returns `Err` if serialization fails.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, FileError> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Write `value` to `path` as four-space indented JSON.
///
/// # Errors
///
/// Returns `Err` on serialization or write failure.
pub async fn save_json_file<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<(), FileError> {
    let path = path.as_ref();
    let text = to_pretty_json(value)?;
    tokio::fs::write(path, text.as_bytes()).await?;
    debug!(path = %path.display(), bytes = text.len(), "json file saved");
    Ok(())
}

/// Read the raw text of a JSON document.
///
/// # Errors
///
/// Returns `Err` if the file cannot be read.
pub async fn read_json_text(path: impl AsRef<Path>) -> Result<String, FileError> {
    Ok(tokio::fs::read_to_string(path).await?)
}

/// Read and parse a JSON document.
///
/// # Errors
///
/// Returns `Err` if the file cannot be read or does not parse as `T`.
pub async fn load_json_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, FileError> {
    let text = read_json_text(path).await?;
    Ok(serde_json::from_str(&text)?)
}
