//! Key/value preferences persisted as a single JSON object on disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to access preferences file {}: {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preferences file {} is not a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    #[error("malformed preferences data: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value stored under `key`, or `None` when the file or the key is absent.
    pub async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let mut entries = self.entries().await?;
        match entries.remove(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Replace the value under `key`, leaving every other key as it was.
    pub async fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let mut entries = self.entries().await?;
        entries.insert(key.to_string(), serde_json::to_value(value)?);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        let bytes = serde_json::to_vec_pretty(&Value::Object(entries))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|source| self.io_error(source))
    }

    async fn entries(&self) -> Result<Map<String, Value>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => return Err(self.io_error(source)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        match serde_json::from_slice(&bytes)? {
            Value::Object(entries) => Ok(entries),
            _ => Err(StoreError::NotAnObject {
                path: self.path.clone(),
            }),
        }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferencesStore::new(dir.path().join("prefs.json"));
        let value: Option<Vec<String>> = store.read("FineHistory").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn write_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"Theme":"dark"}"#).unwrap();

        let store = PreferencesStore::new(&path);
        store.write("FineHistory", &vec![1, 2, 3]).await.unwrap();

        let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["Theme"], "dark");
        assert_eq!(raw["FineHistory"], serde_json::json!([1, 2, 3]));

        let back: Option<Vec<i32>> = store.read("FineHistory").await.unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferencesStore::new(dir.path().join("nested/state/prefs.json"));
        store.write("k", &true).await.unwrap();
        assert_eq!(store.read::<bool>("k").await.unwrap(), Some(true));
    }

    #[tokio::test]
    async fn non_object_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let err = PreferencesStore::new(&path)
            .read::<bool>("k")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotAnObject { .. }));
    }
}
