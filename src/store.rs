//! JSON persistence of downloaded filenames.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tokio::fs;

use crate::Result;

/// Default location of the filename record, relative to the working directory.
pub const DATA_FILE: &str = "image_data.json";

/// A JSON array of filenames stored at a fixed path.
///
/// Saves overwrite the whole file; there is no locking or merging.
#[derive(Debug, Clone)]
pub struct DataStore {
    path: PathBuf,
}

impl DataStore {
    /// A store backed by the file at `path`. Nothing is read until [`DataStore::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `data` to the file, replacing any previous contents.
    pub async fn save(&self, data: &[String]) -> Result<()> {
        let json = serde_json::to_vec(data)?;
        fs::write(&self.path, json).await?;
        tracing::debug!("Saved {} records to {}", data.len(), self.path.display());
        Ok(())
    }

    /// Reads the stored filenames, or an empty list if the file does not exist.
    pub async fn load(&self) -> Result<Vec<String>> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new(DATA_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join(DATA_FILE));

        store.save(&names(&["a.png", "b.png"])).await.unwrap();
        assert_eq!(store.load().await.unwrap(), names(&["a.png", "b.png"]));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join("nothing-here.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join(DATA_FILE));

        store.save(&names(&["a.png", "b.png", "c.png"])).await.unwrap();
        store.save(&names(&["d.png"])).await.unwrap();
        assert_eq!(store.load().await.unwrap(), names(&["d.png"]));
    }

    #[tokio::test]
    async fn test_file_is_plain_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join(DATA_FILE));

        store.save(&names(&["cat.jpg"])).await.unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, r#"["cat.jpg"]"#);
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DATA_FILE);
        std::fs::write(&path, "{\"not\": \"a list\"}").unwrap();

        let result = DataStore::new(path).load().await;
        assert!(matches!(result, Err(crate::Error::Json(_))));
    }

    #[test]
    fn test_default_path() {
        assert_eq!(DataStore::default().path(), Path::new("image_data.json"));
    }
}
