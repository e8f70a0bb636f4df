//! Feature Store Implementations

use crate::{FeatureSet, StorageError};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Extension of feature set files
const FEATURE_FILE_EXTENSION: &str = "features";

/// Keyed persistence of feature sets
pub trait FeatureStore {
    /// Whether a feature set is stored under `key`
    fn contains(&self, key: &str) -> bool;

    /// Store a feature set, replacing any previous one
    fn write(&self, key: &str, set: &FeatureSet) -> Result<(), StorageError>;

    /// Load the feature set stored under `key`
    fn read(&self, key: &str) -> Result<FeatureSet, StorageError>;
}

/// One postcard file per key under a directory
pub struct FileFeatureStore {
    dir: PathBuf,
}

impl FileFeatureStore {
    /// Use `dir` for feature files, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        info!("Feature store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the feature set of `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", sanitize_key(key), FEATURE_FILE_EXTENSION))
    }
}

/// Map a source identity to a flat file name
fn sanitize_key(key: &str) -> String {
    let name: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if name.is_empty() {
        "_".to_string()
    } else {
        name
    }
}

impl FeatureStore for FileFeatureStore {
    fn contains(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    fn write(&self, key: &str, set: &FeatureSet) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let bytes = set.to_bytes()?;

        // Write aside, then rename over the previous file
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &path)?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    fn read(&self, key: &str) -> Result<FeatureSet, StorageError> {
        let path = self.path_for(key);
        let bytes = fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
            _ => StorageError::from(e),
        })?;

        debug!("Read {} bytes from {}", bytes.len(), path.display());
        FeatureSet::from_bytes(&bytes)
    }
}

/// Encoded feature sets held in memory
#[derive(Default)]
pub struct MemoryFeatureStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryFeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored feature sets
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store raw bytes under `key`
    pub fn insert_raw(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Io(format!("Lock error: {}", e)))?;
        entries.insert(key.to_string(), bytes);
        Ok(())
    }
}

impl FeatureStore for MemoryFeatureStore {
    fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|e| e.contains_key(key))
            .unwrap_or(false)
    }

    fn write(&self, key: &str, set: &FeatureSet) -> Result<(), StorageError> {
        self.insert_raw(key, set.to_bytes()?)
    }

    fn read(&self, key: &str) -> Result<FeatureSet, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Io(format!("Lock error: {}", e)))?;
        let bytes = entries
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        FeatureSet::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::FeatureVector;
    use light_curve::StarId;

    fn sample_set() -> FeatureSet {
        let mut set = FeatureSet::new("db", vec![StarId(3)]);
        set.filters.push("R".into());
        set.features.push(vec![FeatureVector::new(vec![1.0, 2.0])]);
        set
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("/data/ogle/curves.json"), "_data_ogle_curves.json");
        assert_eq!(sanitize_key("macho db"), "macho_db");
        assert_eq!(sanitize_key(""), "_");
    }

    #[test]
    fn test_file_store_write_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileFeatureStore::new(dir.path().join("cache")).unwrap();
        let key = "/tmp/curves.json";

        assert!(!store.contains(key));
        store.write(key, &sample_set()).unwrap();
        assert!(store.contains(key));
        assert_eq!(store.read(key).unwrap(), sample_set());
        assert!(store.path_for(key).starts_with(store.dir()));
    }

    #[test]
    fn test_file_store_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileFeatureStore::new(dir.path()).unwrap();

        store.write("db", &sample_set()).unwrap();
        let mut updated = sample_set();
        updated.disabled.push(StarId(3));
        store.write("db", &updated).unwrap();

        assert_eq!(store.read("db").unwrap().disabled, vec![StarId(3)]);
    }

    #[test]
    fn test_file_store_missing_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileFeatureStore::new(dir.path()).unwrap();

        assert!(matches!(store.read("absent"), Err(StorageError::NotFound(_))));

        fs::write(store.path_for("corrupt"), [0xffu8; 3]).unwrap();
        assert!(store.contains("corrupt"));
        assert!(store.read("corrupt").is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryFeatureStore::new();
        assert!(store.is_empty());
        assert!(matches!(store.read("db"), Err(StorageError::NotFound(_))));

        store.write("db", &sample_set()).unwrap();
        assert!(store.contains("db"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.read("db").unwrap(), sample_set());

        store.insert_raw("bad", vec![1, 2]).unwrap();
        assert!(store.read("bad").is_err());
    }
}
