//! Backends for the single string blob the [`Store`](super::Store) persists into.

use std::{
    ffi::OsStr,
    fmt::Debug,
    fs,
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::fs::state_dir;

/// A string keyed slot holding the serialized profile list.
pub trait Storage: Debug {
    /// Returns the stored blob, or `None` if nothing has been written yet.
    fn read(&self) -> io::Result<Option<String>>;

    /// Replace the stored blob with `contents`.
    fn write(&mut self, contents: &str) -> io::Result<()>;

    /// Called when the stored blob could not be parsed, before it gets overwritten.
    fn quarantine(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Keeps the blob in a JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage for `key` inside the state directory.
    ///
    /// The key becomes a file name, so it must be non-empty and free of path
    /// separators.
    pub fn open(key: &str) -> io::Result<Self> {
        if key.is_empty() || key.contains(['/', '\\']) {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid storage key {key:?}"),
            ));
        }

        Ok(Self::new(state_dir()?.join(format!("{key}.json"))))
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl Storage for FileStorage {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&mut self, contents: &str) -> io::Result<()> {
        fs::create_dir_all(self.dir())?;

        // Temp file in the same directory, renamed over the target
        let mut file = NamedTempFile::new_in(self.dir())?;
        file.write_all(contents.as_bytes())?;
        file.persist(&self.path).map_err(|err| err.error)?;

        debug!("Wrote {} bytes to {}", contents.len(), self.path.display());

        Ok(())
    }

    /// Move the unreadable file aside as `<key>-<timestamp>.json.bak`.
    fn quarantine(&mut self) -> io::Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let stem = self
            .path
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or("profiles");
        let backup = self
            .path
            .with_file_name(format!("{stem}-{timestamp}.json.bak"));

        fs::rename(&self.path, &backup)?;

        warn!("Moved unreadable profiles to {}", backup.display());

        Ok(())
    }
}

/// Keeps the blob in memory.
///
/// Clones share the same slot, so a test can hand one clone to a store and keep
/// the other to look at what was written.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blob: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            blob: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.blob.lock().clone()
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.blob.lock().clone())
    }

    fn write(&mut self, contents: &str) -> io::Result<()> {
        *self.blob.lock() = Some(contents.to_string());
        Ok(())
    }
}
