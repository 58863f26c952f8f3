//! TOML file store (std only).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{FocuserSettings, VariableState};
use crate::error::StorageError;

use super::SettingsStore;

/// File name of the configuration document.
pub const PERSISTENT_FILE: &str = "focuser_persist.toml";

/// File name of the position document.
pub const VARIABLE_FILE: &str = "focuser_variable.toml";

/// Stores each document as a TOML file in one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store documents under `dir`. The directory must exist.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the configuration document.
    pub fn persistent_path(&self) -> PathBuf {
        self.dir.join(PERSISTENT_FILE)
    }

    /// Path of the position document.
    pub fn variable_path(&self) -> PathBuf {
        self.dir.join(VARIABLE_FILE)
    }
}

fn message(text: &str) -> heapless::String<128> {
    let mut msg = heapless::String::new();
    for c in text.chars() {
        if msg.push(c).is_err() {
            break;
        }
    }
    msg
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => StorageError::NotFound,
        _ => StorageError::Io(message(&e.to_string())),
    })?;
    toml::from_str(&content).map_err(|e| StorageError::Corrupt(message(e.message())))
}

fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<(), StorageError> {
    let content =
        toml::to_string(document).map_err(|e| StorageError::Corrupt(message(&e.to_string())))?;
    fs::write(path, content).map_err(|e| StorageError::Io(message(&e.to_string())))
}

impl SettingsStore for FileStore {
    fn load_persistent(&mut self) -> Result<FocuserSettings, StorageError> {
        read_document(&self.persistent_path())
    }

    fn save_persistent(&mut self, settings: &FocuserSettings) -> Result<(), StorageError> {
        write_document(&self.persistent_path(), settings)
    }

    fn load_variable(&mut self) -> Result<VariableState, StorageError> {
        read_document(&self.variable_path())
    }

    fn save_variable(&mut self, state: &VariableState) -> Result<(), StorageError> {
        write_document(&self.variable_path(), state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Direction, StepMode};
    use crate::storage::load_or_default;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "focuser-motion-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_variable_document_round_trips() {
        let dir = scratch_dir("variable");
        let mut store = FileStore::new(&dir);
        let state = VariableState {
            current_position: 4_321,
            last_direction: Direction::Outward,
        };

        store.save_variable(&state).unwrap();
        let loaded = store.load_variable().unwrap();

        assert_eq!(loaded, state);
        assert_eq!(loaded.aligned_position(StepMode::Eighth, 10_000), 4_320);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = scratch_dir("missing");
        let mut store = FileStore::new(&dir);
        assert_eq!(store.load_persistent(), Err(StorageError::NotFound));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_corrupt_file_falls_back_and_is_rewritten() {
        let dir = scratch_dir("corrupt");
        let mut store = FileStore::new(&dir);
        fs::write(store.persistent_path(), "max_step = \"lots\"").unwrap();

        assert!(matches!(
            store.load_persistent(),
            Err(StorageError::Corrupt(_))
        ));

        let (settings, _) = load_or_default(&mut store);
        assert_eq!(settings, FocuserSettings::default());
        assert_eq!(store.load_persistent().unwrap(), FocuserSettings::default());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let dir = scratch_dir("partial");
        let mut store = FileStore::new(&dir);
        fs::write(store.persistent_path(), "max_step = 20000\nstep_mode = 4\n").unwrap();

        let settings = store.load_persistent().unwrap();
        assert_eq!(settings.max_step, 20_000);
        assert_eq!(settings.step_mode, StepMode::Quarter);
        assert_eq!(settings.tcp_port, 2020);
        fs::remove_dir_all(&dir).unwrap();
    }
}
