// Named key-value slots backing the task store

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CURRENT_VERSION: u32 = 1;

/// A local key-value store holding string values under named slots
pub trait Slot {
    /// Read the value stored under `key`, `None` when the slot is empty
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Directory-backed slots: one `<key>.json` file per slot
///
/// The `<key>.lock` lock is held for the duration of a single `set` only.
/// It keeps concurrent writers from interleaving a write but does not span a
/// `get` followed by `set`, so two processes doing read-modify-write can
/// still lose one of the updates.
#[derive(Debug, Clone)]
pub struct FileSlot {
    base_path: PathBuf,
}

impl FileSlot {
    /// Open or create a slot directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        fs::create_dir_all(&base_path).context("Failed to create slot directory")?;

        let slot = Self { base_path };
        slot.write_version()?;

        info!(path = ?slot.base_path, "Opened slot directory");
        Ok(slot)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// File that holds the value for `key`
    pub fn slot_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.json", key)))
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.lock", key))
    }

    fn write_version(&self) -> Result<()> {
        let version_path = self.base_path.join(".version");
        if !version_path.exists() {
            fs::write(version_path, CURRENT_VERSION.to_string())?;
        }
        Ok(())
    }
}

impl Slot for FileSlot {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        if !path.exists() {
            debug!(key, "Slot file missing");
            return Ok(None);
        }

        let content = fs::read_to_string(&path).with_context(|| format!("Failed to read slot file {:?}", path))?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path(key))
            .context("Failed to open slot lock file")?;

        // Held until `lock` is dropped
        lock.lock_exclusive().context("Failed to acquire slot lock")?;

        // Write beside the slot and rename over it so readers never see a partial file
        let tmp_path = self.base_path.join(format!(".{}.json.tmp", key));
        let mut file = File::create(&tmp_path).context("Failed to create temporary slot file")?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, &path).context("Failed to replace slot file")?;

        debug!(key, bytes = value.len(), "Wrote slot");
        Ok(())
    }
}

/// In-memory slots for tests and throwaway sessions
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    values: HashMap<String, String>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Slot for MemorySlot {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Slot keys double as file names
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Slot key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Slot key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid slot key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}
