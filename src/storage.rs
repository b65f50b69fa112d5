use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::Value;

/// Storage key for the four accessibility flags.
pub const ACCESSIBILITY_KEY: &str = "charge-sense-accessibility";
/// Storage key for the research preferences (not the event log).
pub const RESEARCH_KEY: &str = "charge-sense-research";

/// Failure of the local key-value storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Storage is disabled or could not be initialized.
    Unavailable(String),
    /// Reading a key failed.
    Read(String),
    /// Writing a key failed.
    Write(String),
    /// The value could not be serialized.
    Serialize(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Unavailable(e) => write!(f, "Storage unavailable: {e}"),
            StorageError::Read(e) => write!(f, "Storage read failed: {e}"),
            StorageError::Write(e) => write!(f, "Storage write failed: {e}"),
            StorageError::Serialize(e) => write!(f, "Storage serialization failed: {e}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// JavaScript truthiness of a stored JSON value. Absent counts as false.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Synchronous string key-value storage, the desktop stand-in for a
/// browser's local storage. Every call may fail; callers log and carry on.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One JSON file per key inside a private config directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Config directory: Windows → AppData/Local/ChargeSense/
    /// Linux → ~/.config/ChargeSense/
    pub fn default_dir() -> PathBuf {
        dirs::config_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ChargeSense")
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are fixed constants, but keep separators out of file names anyway.
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::Unavailable(e.to_string()))?;

        // Restrictive permissions on the config directory (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&self.dir, fs::Permissions::from_mode(0o700));
        }

        let path = self.path_for(key);
        fs::write(&path, value).map_err(|e| StorageError::Write(e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&path, fs::Permissions::from_mode(0o600));
        }
        Ok(())
    }
}

/// Process-local storage. `disabled()` simulates storage that throws on
/// every access (private browsing, quota exceeded).
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    disabled: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn disabled() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            disabled: true,
        }
    }

    /// Seed a raw value, bypassing serialization. Used to stage corrupt data.
    #[cfg(test)]
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        self
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.disabled {
            return Err(StorageError::Unavailable("storage is disabled".into()));
        }
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Read(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.disabled {
            return Err(StorageError::Unavailable("storage is disabled".into()));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Write(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));
        assert_eq!(storage.get(ACCESSIBILITY_KEY).unwrap(), None);
        storage.set(ACCESSIBILITY_KEY, r#"{"largeText":true}"#).unwrap();
        assert_eq!(
            storage.get(ACCESSIBILITY_KEY).unwrap().as_deref(),
            Some(r#"{"largeText":true}"#)
        );
        assert!(dir.path().join("nested").join("charge-sense-accessibility.json").exists());
    }

    #[test]
    fn test_file_storage_keys_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set(ACCESSIBILITY_KEY, "a").unwrap();
        storage.set(RESEARCH_KEY, "b").unwrap();
        assert_eq!(storage.get(ACCESSIBILITY_KEY).unwrap().as_deref(), Some("a"));
        assert_eq!(storage.get(RESEARCH_KEY).unwrap().as_deref(), Some("b"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("cs"));
        storage.set(RESEARCH_KEY, "{}").unwrap();
        let meta = fs::metadata(dir.path().join("cs").join("charge-sense-research.json")).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn test_memory_storage_disabled_fails_every_call() {
        let storage = MemoryStorage::disabled();
        assert!(matches!(storage.get("k"), Err(StorageError::Unavailable(_))));
        assert!(matches!(storage.set("k", "v"), Err(StorageError::Unavailable(_))));
    }

    #[test]
    fn test_memory_storage_seeded_entry() {
        let storage = MemoryStorage::new().with_entry(RESEARCH_KEY, "not json");
        assert_eq!(storage.get(RESEARCH_KEY).unwrap().as_deref(), Some("not json"));
    }
}
