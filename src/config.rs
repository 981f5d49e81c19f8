use parking_lot::Mutex;
use serde_json::Value;
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{error::MarginaliaError, view_state::PersistedSettings};

/// Host storage for the persisted settings blob.
///
/// `load` hands back the raw blob as a [serde_json::Value] whatever the storage format, so
/// that [crate::view_state::ViewState::repair] can recover it key by key. `Ok(None)` means
/// nothing has been stored yet.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Option<Value>, MarginaliaError>;
    fn save(&self, settings: &PersistedSettings) -> Result<(), MarginaliaError>;
}

impl<T: SettingsStore + ?Sized> SettingsStore for Box<T> {
    fn load(&self) -> Result<Option<Value>, MarginaliaError> {
        (**self).load()
    }

    fn save(&self, settings: &PersistedSettings) -> Result<(), MarginaliaError> {
        (**self).save(settings)
    }
}

/// Settings kept in a toml file.
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        TomlSettingsStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for TomlSettingsStore {
    fn load(&self) -> Result<Option<Value>, MarginaliaError> {
        tracing::debug!("Attempting to read settings from: {:?}", &self.path);
        if !self.path.exists() {
            tracing::debug!("Settings file not found, using defaults.");
            return Ok(None);
        }
        let content = read_to_string(&self.path)?;
        let table: toml::Value = toml::from_str(&content)?;
        Ok(Some(serde_json::to_value(table)?))
    }

    fn save(&self, settings: &PersistedSettings) -> Result<(), MarginaliaError> {
        tracing::debug!("Attempting to write settings to: {:?}", &self.path);
        let toml_string = toml::to_string(settings)?;
        write(&self.path, toml_string)?;
        Ok(())
    }
}

/// Settings held in memory, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore(Arc<Mutex<Option<Value>>>);

impl MemorySettingsStore {
    pub fn with_blob(blob: Value) -> Self {
        MemorySettingsStore(Arc::new(Mutex::new(Some(blob))))
    }

    /// The blob as last saved (or seeded).
    pub fn snapshot(&self) -> Option<Value> {
        self.0.lock().clone()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Option<Value>, MarginaliaError> {
        Ok(self.snapshot())
    }

    fn save(&self, settings: &PersistedSettings) -> Result<(), MarginaliaError> {
        *self.0.lock() = Some(serde_json::to_value(settings)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{annotation::Category, query::SortOrder, view_state::ViewState};
    use tempfile::TempDir;

    #[test]
    fn test_toml_store_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = TomlSettingsStore::new(dir.path().join("settings.toml"));
        assert_eq!(store.load(), Ok(None));
    }

    #[test]
    fn test_toml_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = TomlSettingsStore::new(dir.path().join("settings.toml"));

        let mut state = ViewState::default();
        let _ = state.set_font_size(20);
        let _ = state.set_category_sort_order(Category::Comment, SortOrder::Alphabetical);
        let _ = state.toggle_category_visible(Category::Footnote);
        store.save(&state.persisted()).unwrap();

        let restored = ViewState::repair(store.load().unwrap().as_ref());
        assert_eq!(restored.persisted(), state.persisted());
    }

    #[test]
    fn test_toml_store_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "fontSizePx = 999\n\n[categoryCollapsed]\nfootnote = true\n",
        )
        .unwrap();

        let state = ViewState::repair(TomlSettingsStore::new(&path).load().unwrap().as_ref());
        assert_eq!(state.font_size_px(), 24);
        assert!(state.is_collapsed(Category::Footnote));
        assert!(!state.is_collapsed(Category::Highlight));
        assert!(state.is_visible(Category::Comment));
    }

    #[test]
    fn test_toml_store_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "fontSizePx = = 3").unwrap();
        let result = TomlSettingsStore::new(&path).load();
        assert!(matches!(result, Err(MarginaliaError::Serialization(_))));
    }

    #[test]
    fn test_memory_store_shares_between_clones() {
        let store = MemorySettingsStore::default();
        let observer = store.clone();
        store.save(&ViewState::default().persisted()).unwrap();
        assert!(observer.snapshot().is_some());
    }
}
