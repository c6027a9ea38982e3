use std::{
    collections::HashMap,
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    warn,
};

use crate::core::PointLearnError;

const APP_NAME: &str = "pointlearn";

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join(APP_NAME);
        let _ = fs::create_dir_all(&app_dir);
        app_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn save_json<T: Serialize>(data: &T, file_path: &Path) -> Result<(), PointLearnError> {
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)?;
    fs::write(file_path, json)?;
    debug!("Data saved to: {}", file_path.display());
    Ok(())
}

pub fn load_json<T: for<'de> Deserialize<'de> + Default>(
    file_path: &Path,
) -> Result<T, PointLearnError> {
    if !file_path.exists() {
        return Ok(T::default());
    }

    let json = fs::read_to_string(file_path)?;
    let data: T = serde_json::from_str(&json)?;
    debug!("Data loaded from: {}", file_path.display());
    Ok(data)
}

pub fn load_json_or_default<T: for<'de> Deserialize<'de> + Default>(file_path: &Path) -> T {
    match load_json::<T>(file_path) {
        Ok(data) => data,
        Err(e) => {
            warn!("Failed to load {}: {}. Using defaults.", file_path.display(), e);
            T::default()
        }
    }
}

/// Durable string storage addressed by key, the shape of browser local storage.
pub trait KeyValueStorage: Send {
    fn get_item(&self, key: &str) -> Result<Option<String>, PointLearnError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PointLearnError>;
    fn remove_item(&mut self, key: &str) -> Result<(), PointLearnError>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn in_app_data_dir() -> Self {
        Self::new(get_app_data_dir())
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PointLearnError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PointLearnError> {
        fs::create_dir_all(&self.dir)?;
        // Atomic replace via rename.
        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), PointLearnError> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)?;
            debug!("Deleted: {}", path.display());
        }
        Ok(())
    }
}

/// In-process storage with an optional byte quota, mirroring a browser quota error.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self { items: HashMap::new(), quota: Some(quota) }
    }

    pub fn with_item(mut self, key: &str, value: &str) -> Self {
        self.items.insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_quota(&mut self, quota: Option<usize>) {
        self.quota = quota;
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PointLearnError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PointLearnError> {
        if let Some(quota) = self.quota {
            if value.len() > quota {
                return Err(PointLearnError::Storage(format!(
                    "Quota exceeded: {} bytes > {} bytes",
                    value.len(),
                    quota
                )));
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), PointLearnError> {
        self.items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_dir() -> PathBuf {
    std::env::temp_dir().join(format!("pointlearn-test-{}", uuid::Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = test_dir();
        let mut storage = FileStorage::new(&dir);

        assert_eq!(storage.get_item("progress").unwrap(), None);
        storage.set_item("progress", "{\"a\":1}").unwrap();
        assert_eq!(storage.get_item("progress").unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(storage.path_for("progress").exists());

        storage.remove_item("progress").unwrap();
        assert_eq!(storage.get_item("progress").unwrap(), None);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_memory_storage_quota() {
        let mut storage = MemoryStorage::with_quota(4);
        assert!(storage.set_item("k", "abcd").is_ok());
        assert!(matches!(storage.set_item("k", "abcde"), Err(PointLearnError::Storage(_))));
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("abcd"));
    }

    #[test]
    fn test_load_json_or_default_on_corrupt_file() {
        let dir = test_dir();
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let data: HashMap<String, u32> = load_json_or_default(&path);
        assert!(data.is_empty());

        let missing: HashMap<String, u32> = load_json(&dir.join("missing.json")).unwrap();
        assert!(missing.is_empty());

        let _ = fs::remove_dir_all(dir);
    }
}
