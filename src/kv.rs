// Key-value byte stores backing persisted state

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A flat byte store addressed by string keys
pub trait KvStore {
    /// Read the bytes stored under `key`, `None` if nothing was ever written
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the bytes stored under `key`
    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<()>;
}

/// In-process store, nothing survives the process
#[derive(Debug, Default, Clone)]
pub struct MemoryKv {
    slots: HashMap<String, Vec<u8>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        self.slots.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per slot
///
/// Writes go to a temp file that is fsynced and renamed over the slot while an
/// exclusive lock is held on `<key>.lock`, so readers only ever see a complete
/// value and two processes never interleave a write.
#[derive(Debug)]
pub struct FileKv {
    base_path: PathBuf,
}

impl FileKv {
    /// Open or create a store rooted at the given directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;
        debug!(path = ?base_path, "Opened file store");
        Ok(Self { base_path })
    }

    /// Get the base path of this store
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the file holding `key`
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }

    /// Keys become file names, so only `[A-Za-z0-9_-]` up to 64 bytes is accepted
    fn validate_key(key: &str) -> Result<()> {
        if key.is_empty() || key.len() > 64 {
            return Err(eyre!("Storage key must be 1-64 bytes long, got {} bytes", key.len()));
        }
        if let Some(bad) = key.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-')) {
            return Err(eyre!("Storage key {:?} contains {:?}, which is not allowed in a slot file name", key, bad));
        }
        Ok(())
    }

    /// Write `bytes` to `tmp`, fsync, then rename it over `path`
    fn replace_with(tmp: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = fs::File::create(tmp).context("Failed to create temp file")?;
        file.write_all(bytes)?;
        file.sync_all()?; // Ensure data is flushed to disk
        drop(file);

        fs::rename(tmp, path).with_context(|| format!("Failed to replace {:?}", path))
    }
}

impl KvStore for FileKv {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Self::validate_key(key)?;

        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path).with_context(|| format!("Failed to read {:?}", path))?;
        Ok(Some(bytes))
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        Self::validate_key(key)?;

        let lock_path = self.base_path.join(format!("{}.lock", key));
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .context("Failed to open lock file")?;

        // Acquire exclusive lock before writing
        lock.lock_exclusive().context("Failed to acquire file lock")?;

        let path = self.slot_path(key);
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = Self::replace_with(&tmp, &path, bytes) {
            if tmp.exists() {
                if let Err(cleanup) = fs::remove_file(&tmp) {
                    warn!(path = ?tmp, error = ?cleanup, "Failed to remove temp file");
                }
            }
            return Err(e);
        }

        debug!(key, bytes = bytes.len(), "Wrote slot");

        // Lock is automatically released when file is dropped
        Ok(())
    }
}
