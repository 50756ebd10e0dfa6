// Filesystem-backed cache store.
// One JSON file per key, written atomically via a temp file.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Serialize, de::DeserializeOwned};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{CacheEntry, CacheStore};
use crate::error::Result;

/// Cache store that persists entries as JSON files under a root directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Store rooted at an explicit directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store under the user cache directory for `app`
    /// (~/.cache/<app> on Linux). `None` if no home directory is known.
    pub fn for_app(app: &str) -> Option<Self> {
        ProjectDirs::from("", "", app).map(|dirs| Self::new(dirs.cache_dir()))
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

/// Sanitize a key for use as a file name.
/// Replaces problematic characters with underscores.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[async_trait]
impl<T> CacheStore<T> for FileStore
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<CacheEntry<T>>> {
        let path = self.entry_path(key);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let entry: CacheEntry<T> = serde_json::from_str(&contents)?;
        Ok(Some(entry))
    }

    async fn set(&self, key: &str, entry: CacheEntry<T>) -> Result<()> {
        let path = self.entry_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&entry)?;

        // Write atomically via temp file
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &path).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };
        store.set("user/1", CacheEntry::new(data.clone())).await.unwrap();

        let entry: Option<CacheEntry<TestData>> = store.get("user/1").await.unwrap();
        assert_eq!(entry.map(|e| e.data), Some(data));
    }

    #[tokio::test]
    async fn test_get_absent_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        let entry: Option<CacheEntry<TestData>> = store.get("missing").await.unwrap();
        assert!(entry.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        std::fs::write(temp_dir.path().join("bad.json"), "not json").unwrap();
        let entry: Result<Option<CacheEntry<TestData>>> = store.get("bad").await;
        assert!(entry.is_err());
    }

    #[tokio::test]
    async fn test_no_leftover_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        store.set("k", CacheEntry::new(1i32)).await.unwrap();
        assert!(temp_dir.path().join("k.json").exists());
        assert!(!temp_dir.path().join("k.tmp").exists());
    }

    #[test]
    fn test_for_app_roots_under_cache_dir() {
        // None only when no home directory is known.
        if let Some(store) = FileStore::for_app("swr") {
            assert!(store.root().ends_with("swr"));
        }
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("simple"), "simple");
        assert_eq!(sanitize_key("user/1"), "user_1");
        assert_eq!(sanitize_key("a:b?c"), "a_b_c");
    }
}
