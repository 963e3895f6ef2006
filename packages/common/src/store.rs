use crate::error::StoreError;
use crate::result::StoreResult;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Flat store of image files keyed by file name
///
/// Baselines, current captures and diffs each live in one of these. Keys are
/// plain file names such as `home-1280x720.png`.
pub trait ImageStore {
    /// Make the store ready for writes (creates the backing directory)
    fn prepare(&self) -> StoreResult<()>;

    /// Check if an entry exists
    fn exists(&self, key: &str) -> bool;

    /// Read an entry's bytes
    fn read(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Write an entry, replacing any previous content
    fn write(&self, key: &str, bytes: &[u8]) -> StoreResult<()>;

    /// Where an entry lives, for reporting
    fn locate(&self, key: &str) -> PathBuf;
}

impl<S: ImageStore + ?Sized> ImageStore for Box<S> {
    fn prepare(&self) -> StoreResult<()> {
        (**self).prepare()
    }

    fn exists(&self, key: &str) -> bool {
        (**self).exists(key)
    }

    fn read(&self, key: &str) -> StoreResult<Vec<u8>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, bytes: &[u8]) -> StoreResult<()> {
        (**self).write(key, bytes)
    }

    fn locate(&self, key: &str) -> PathBuf {
        (**self).locate(key)
    }
}

/// Directory-backed store
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageStore for DirStore {
    fn prepare(&self) -> StoreResult<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| StoreError::io(&self.root, e))
    }

    fn exists(&self, key: &str) -> bool {
        self.locate(key).is_file()
    }

    fn read(&self, key: &str) -> StoreResult<Vec<u8>> {
        let path = self.locate(key);
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound {
                key: key.to_string(),
                location: self.root.clone(),
            },
            _ => StoreError::io(path, e),
        })
    }

    fn write(&self, key: &str, bytes: &[u8]) -> StoreResult<()> {
        let path = self.locate(key);
        tracing::trace!("Writing {} bytes to {}", bytes.len(), path.display());
        std::fs::write(&path, bytes).map_err(|e| StoreError::io(path, e))
    }

    fn locate(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

/// In-memory store for testing
///
/// Clones share the same entries, so a test can keep a handle while the
/// pipeline owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    label: String,
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create an empty store; `label` prefixes reported locations
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            files: Arc::default(),
        }
    }

    pub fn insert(&self, key: impl Into<String>, bytes: Vec<u8>) {
        self.files().insert(key.into(), bytes);
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.files().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.files().keys().cloned().collect()
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageStore for MemoryStore {
    fn prepare(&self) -> StoreResult<()> {
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        self.files().contains_key(key)
    }

    fn read(&self, key: &str) -> StoreResult<Vec<u8>> {
        self.get(key).ok_or_else(|| StoreError::NotFound {
            key: key.to_string(),
            location: PathBuf::from(&self.label),
        })
    }

    fn write(&self, key: &str, bytes: &[u8]) -> StoreResult<()> {
        self.insert(key, bytes.to_vec());
        Ok(())
    }

    fn locate(&self, key: &str) -> PathBuf {
        PathBuf::from(&self.label).join(key)
    }
}
