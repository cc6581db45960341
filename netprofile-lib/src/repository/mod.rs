use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::Result;

mod config;
mod entities;
mod storage;
mod store;

pub use config::{CoreConfig, DEFAULT_EXPORT_FILE_NAME, DEFAULT_STORAGE_KEY};
pub use entities::{Mode, Profile, ProfileId};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{Store, deserialize};

/// Central access point for all persistent data.
///
/// The [`Repository`] pairs the user's [`CoreConfig`] with the [`Store`] it points
/// at, and handles exporting to and importing from files.
#[derive(Debug)]
pub struct Repository {
    store: Store,
    cfg: CoreConfig,
}

impl Repository {
    /// Open the store named by the configuration in the user's config directory.
    pub fn new() -> Result<Self> {
        Self::with_config(CoreConfig::load()?)
    }

    pub fn with_config(cfg: CoreConfig) -> Result<Self> {
        let storage = FileStorage::open(cfg.storage_key())?;
        Ok(Self::with_storage(cfg, storage))
    }

    pub fn with_storage(cfg: CoreConfig, storage: impl Storage + 'static) -> Self {
        Self {
            store: Store::load(storage),
            cfg,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn profiles(&self) -> &[Profile] {
        self.store.profiles()
    }

    /// Write every profile to `dir`, under the configured export file name.
    pub fn export(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.cfg.export_file_name());
        self.export_to(&path)?;
        Ok(path)
    }

    pub fn export_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.store.serialize()?)?;

        info!("Exported {} profiles to {}", self.store.len(), path.display());

        Ok(())
    }

    /// Replace every profile with the ones in `path`.
    ///
    /// The file must hold a UTF-8 JSON array of profile objects. Anything else is
    /// rejected as a format error and the current profiles are left alone.
    pub fn import_from(&mut self, path: &Path) -> Result<usize> {
        let profiles = deserialize(fs::read(path)?)?;
        let count = profiles.len();

        self.store.replace_all(profiles)?;

        Ok(count)
    }

    #[cfg(test)]
    /// Return a mock version of a [`Repository`] backed by in-memory storage and the default
    /// configuration.
    pub(crate) fn mock(storage: MemoryStorage) -> Self {
        Self::with_storage(CoreConfig::default(), storage)
    }
}
