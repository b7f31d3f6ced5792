use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse '{path}' at {at}: {source}")]
    Json {
        path: PathBuf,
        at: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid '{path}': {message}")]
    Invalid { path: PathBuf, message: String },
}

impl ContentError {
    pub(crate) fn invalid(path: &Path, message: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Reads and deserializes a JSON file. Parse errors carry the JSON path of
/// the offending field.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, ContentError> {
    let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut deserializer = serde_json::Deserializer::from_str(&raw);
    serde_path_to_error::deserialize::<_, T>(&mut deserializer).map_err(|error| {
        let at = error.path().to_string();
        ContentError::Json {
            path: path.to_path_buf(),
            at: if at.is_empty() { ".".to_string() } else { at },
            source: error.into_inner(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[allow(dead_code)]
        items: Vec<Item>,
    }

    #[derive(Debug, Deserialize)]
    struct Item {
        #[allow(dead_code)]
        rate: f32,
    }

    #[test]
    fn missing_file_is_io_error() {
        let temp = TempDir::new().expect("temp");
        let error = read_json_file::<Sample>(&temp.path().join("nope.json")).expect_err("missing");
        assert!(matches!(error, ContentError::Io { .. }));
    }

    #[test]
    fn parse_error_reports_field_path() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("sample.json");
        fs::write(&path, r#"{ "items": [ { "rate": 1 }, { "rate": "fast" } ] }"#).expect("write");

        let error = read_json_file::<Sample>(&path).expect_err("bad type");
        match error {
            ContentError::Json { at, .. } => assert_eq!(at, "items[1].rate"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
