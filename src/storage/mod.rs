//! Settings storage.
//!
//! The controller never talks to flash or files directly. It hands its two
//! documents to a [`SettingsStore`] when they are due for writing.

#[cfg(feature = "std")]
mod file;

#[cfg(feature = "std")]
pub use file::{FileStore, PERSISTENT_FILE, VARIABLE_FILE};

use crate::config::{FocuserSettings, VariableState};
use crate::error::StorageError;

/// Backing medium for the persistent and variable documents.
pub trait SettingsStore {
    /// Read the configuration document.
    fn load_persistent(&mut self) -> Result<FocuserSettings, StorageError>;

    /// Write the configuration document.
    fn save_persistent(&mut self, settings: &FocuserSettings) -> Result<(), StorageError>;

    /// Read the position document.
    fn load_variable(&mut self) -> Result<VariableState, StorageError>;

    /// Write the position document.
    fn save_variable(&mut self, state: &VariableState) -> Result<(), StorageError>;
}

impl<T: SettingsStore + ?Sized> SettingsStore for &mut T {
    fn load_persistent(&mut self) -> Result<FocuserSettings, StorageError> {
        (**self).load_persistent()
    }

    fn save_persistent(&mut self, settings: &FocuserSettings) -> Result<(), StorageError> {
        (**self).save_persistent(settings)
    }

    fn load_variable(&mut self) -> Result<VariableState, StorageError> {
        (**self).load_variable()
    }

    fn save_variable(&mut self, state: &VariableState) -> Result<(), StorageError> {
        (**self).save_variable(state)
    }
}

/// Load both documents, replacing any that are missing or corrupt with
/// defaults and writing the defaults back straight away.
///
/// Never fails: a store that cannot be written is logged and the defaults
/// are used for this session.
pub fn load_or_default<S: SettingsStore + ?Sized>(store: &mut S) -> (FocuserSettings, VariableState) {
    let mut settings = match store.load_persistent() {
        Ok(settings) => settings,
        Err(_e) => {
            warn!("persistent settings unreadable, restoring defaults");
            let defaults = FocuserSettings::default();
            if store.save_persistent(&defaults).is_err() {
                warn!("could not rewrite persistent settings");
            }
            defaults
        }
    };
    settings.sanitize();

    let variable = match store.load_variable() {
        Ok(state) => state,
        Err(_e) => {
            warn!("variable settings unreadable, restoring defaults");
            let defaults = VariableState::default();
            if store.save_variable(&defaults).is_err() {
                warn!("could not rewrite variable settings");
            }
            defaults
        }
    };

    (settings, variable)
}

/// In-memory store.
///
/// Used on boards that persist through their own mechanism, and in tests,
/// where the write counters show how often flash would have been touched.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    persistent: Option<FocuserSettings>,
    variable: Option<VariableState>,
    persistent_writes: u32,
    variable_writes: u32,
}

impl MemoryStore {
    /// An empty store; both loads report [`StorageError::NotFound`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with both documents.
    pub fn with_documents(settings: FocuserSettings, variable: VariableState) -> Self {
        Self {
            persistent: Some(settings),
            variable: Some(variable),
            ..Self::default()
        }
    }

    /// Last written configuration document.
    pub fn persistent(&self) -> Option<&FocuserSettings> {
        self.persistent.as_ref()
    }

    /// Last written position document.
    pub fn variable(&self) -> Option<&VariableState> {
        self.variable.as_ref()
    }

    /// Number of configuration writes.
    pub fn persistent_writes(&self) -> u32 {
        self.persistent_writes
    }

    /// Number of position writes.
    pub fn variable_writes(&self) -> u32 {
        self.variable_writes
    }
}

impl SettingsStore for MemoryStore {
    fn load_persistent(&mut self) -> Result<FocuserSettings, StorageError> {
        self.persistent.clone().ok_or(StorageError::NotFound)
    }

    fn save_persistent(&mut self, settings: &FocuserSettings) -> Result<(), StorageError> {
        self.persistent = Some(settings.clone());
        self.persistent_writes += 1;
        Ok(())
    }

    fn load_variable(&mut self) -> Result<VariableState, StorageError> {
        self.variable.ok_or(StorageError::NotFound)
    }

    fn save_variable(&mut self, state: &VariableState) -> Result<(), StorageError> {
        self.variable = Some(*state);
        self.variable_writes += 1;
        Ok(())
    }
}
