// core/src/session/store.rs
use crate::error::PayKitError;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// String key-value persistence behind the token store.
pub trait KeyValueStore: Send + Sync {
  fn get(&self, key: &str) -> Result<Option<String>, PayKitError>;
  fn set(&self, key: &str, value: &str) -> Result<(), PayKitError>;
  fn remove(&self, key: &str) -> Result<(), PayKitError>;
}

/// Process-lifetime store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl KeyValueStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<String>, PayKitError> {
    Ok(self.entries.lock().get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<(), PayKitError> {
    self.entries.lock().insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), PayKitError> {
    self.entries.lock().remove(key);
    Ok(())
  }
}

/// A JSON object on disk, rewritten whole on every change.
///
/// A missing file reads as empty. So does an unreadable one, after a warning,
/// so a damaged session file behaves like a logged-out session.
#[derive(Debug)]
pub struct FileStore {
  path: PathBuf,
  lock: Mutex<()>,
}

impl FileStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      lock: Mutex::new(()),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn load(&self) -> Result<BTreeMap<String, String>, PayKitError> {
    let raw = match std::fs::read_to_string(&self.path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
      Err(e) => {
        return Err(PayKitError::Storage(format!(
          "failed to read session file {}: {e}",
          self.path.display()
        )))
      }
    };
    if raw.trim().is_empty() {
      return Ok(BTreeMap::new());
    }
    match serde_json::from_str(&raw) {
      Ok(entries) => Ok(entries),
      Err(e) => {
        warn!(path = %self.path.display(), error = %e, "Session file is not valid JSON; treating it as empty.");
        Ok(BTreeMap::new())
      }
    }
  }

  fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), PayKitError> {
    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)
        .map_err(|e| PayKitError::Storage(format!("failed to create {}: {e}", parent.display())))?;
    }
    let body = serde_json::to_string_pretty(entries)
      .map_err(|e| PayKitError::Storage(format!("failed to encode session: {e}")))?;
    let tmp = self.path.with_extension("tmp");
    std::fs::write(&tmp, body).map_err(|e| PayKitError::Storage(format!("failed to write {}: {e}", tmp.display())))?;
    std::fs::rename(&tmp, &self.path)
      .map_err(|e| PayKitError::Storage(format!("failed to replace {}: {e}", self.path.display())))?;
    debug!(path = %self.path.display(), keys = entries.len(), "Session file written.");
    Ok(())
  }
}

impl KeyValueStore for FileStore {
  fn get(&self, key: &str) -> Result<Option<String>, PayKitError> {
    let _guard = self.lock.lock();
    Ok(self.load()?.remove(key))
  }

  fn set(&self, key: &str, value: &str) -> Result<(), PayKitError> {
    let _guard = self.lock.lock();
    let mut entries = self.load()?;
    entries.insert(key.to_string(), value.to_string());
    self.save(&entries)
  }

  fn remove(&self, key: &str) -> Result<(), PayKitError> {
    let _guard = self.lock.lock();
    let mut entries = self.load()?;
    if entries.remove(key).is_some() {
      self.save(&entries)?;
    }
    Ok(())
  }
}
