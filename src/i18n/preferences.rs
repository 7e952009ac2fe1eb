//! Persisted user preferences

use std::{
    collections::BTreeMap,
    fs, io,
    path::PathBuf,
    sync::{PoisonError, RwLock},
};

use mockall::automock;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Key the selected locale is stored under.
pub const LOCALE_PREFERENCE_KEY: &str = "preferred-locale";

/// Failure to read or write preferences
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The preferences file could not be read or written
    #[error("preferences I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The preferences file is not a JSON object of strings
    #[error("preferences file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key-value store that outlives the process.
#[automock]
pub trait PreferenceStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// In-memory preferences, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: RwLock<FxHashMap<String, String>>,
}

impl MemoryPreferenceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);

        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());

        Ok(())
    }
}

/// Preferences kept in a JSON object file.
///
/// A missing file reads as empty; the file and its parent directory are
/// created on first write.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    /// Create a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(error) => Err(error.into()),
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;

        Ok(())
    }
}
