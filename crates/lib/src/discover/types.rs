//! Types for discovery: managed binaries and the shared inventory.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::update::UpdateError;

/// An on-disk executable matched to the source it was built from.
#[derive(Debug, Clone, Serialize)]
pub struct ManagedBinary {
  /// Absolute path; unique within an inventory.
  pub path: PathBuf,
  pub source_id: String,
  /// Whether the binary can be replaced in place.
  pub writable: bool,
  #[serde(rename = "error", serialize_with = "serialize_error", skip_serializing_if = "Option::is_none")]
  pub(crate) last_error: Option<Arc<UpdateError>>,
}

impl ManagedBinary {
  pub fn new(path: impl Into<PathBuf>, source_id: impl Into<String>, writable: bool) -> Self {
    Self {
      path: path.into(),
      source_id: source_id.into(),
      writable,
      last_error: None,
    }
  }

  /// Error recorded by the most recent update attempt.
  pub fn last_error(&self) -> Option<&UpdateError> {
    self.last_error.as_deref()
  }
}

fn serialize_error<S: Serializer>(err: &Option<Arc<UpdateError>>, serializer: S) -> Result<S::Ok, S::Error> {
  match err {
    Some(err) => serializer.serialize_str(&err.to_string()),
    None => serializer.serialize_none(),
  }
}

/// Errors that abort discovery.
#[derive(Debug, Error)]
pub enum DiscoverError {
  #[error("couldn't find any search paths")]
  NoSearchPaths,
}

/// The set of managed binaries found by one invocation.
///
/// Cloning yields another handle to the same collection. A single lock
/// guards both accumulation during discovery and per-binary error updates.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
  binaries: Arc<Mutex<Vec<ManagedBinary>>>,
}

impl Inventory {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build an inventory from known binaries, sorted by path.
  pub fn from_binaries(mut binaries: Vec<ManagedBinary>) -> Self {
    binaries.sort_by(|a, b| a.path.cmp(&b.path));
    Self {
      binaries: Arc::new(Mutex::new(binaries)),
    }
  }

  fn lock(&self) -> MutexGuard<'_, Vec<ManagedBinary>> {
    self.binaries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub(crate) fn push(&self, binary: ManagedBinary) {
    self.lock().push(binary);
  }

  /// Copy of every binary, in inventory order.
  pub fn snapshot(&self) -> Vec<ManagedBinary> {
    self.lock().clone()
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  pub fn get(&self, path: &Path) -> Option<ManagedBinary> {
    self.lock().iter().find(|b| b.path == path).cloned()
  }

  /// Remove and return the binary at `path`.
  pub fn remove(&self, path: &Path) -> Option<ManagedBinary> {
    let mut binaries = self.lock();
    let index = binaries.iter().position(|b| b.path == path)?;
    Some(binaries.remove(index))
  }

  /// Keep only binaries whose source has one of `prefixes` as a literal prefix.
  ///
  /// An empty filter list keeps everything.
  pub(crate) fn retain_prefixes(&self, prefixes: &[String]) {
    if prefixes.is_empty() {
      return;
    }
    self
      .lock()
      .retain(|b| prefixes.iter().any(|p| b.source_id.starts_with(p.as_str())));
  }

  pub(crate) fn sort(&self) {
    self.lock().sort_by(|a, b| a.path.cmp(&b.path));
  }

  /// Store `error` as the outcome for `path` and return the updated record.
  pub(crate) fn record(&self, path: &Path, error: Option<Arc<UpdateError>>) -> Option<ManagedBinary> {
    let mut binaries = self.lock();
    let binary = binaries.iter_mut().find(|b| b.path == path)?;
    binary.last_error = error;
    Some(binary.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn filters_keep_literal_prefix_matches() {
    let inventory = Inventory::from_binaries(vec![
      ManagedBinary::new("/bin/a", "x/a", true),
      ManagedBinary::new("/bin/b", "z/b", true),
      ManagedBinary::new("/bin/c", "y", true),
    ]);

    inventory.retain_prefixes(&["x".to_string(), "y".to_string()]);

    let ids: Vec<_> = inventory.snapshot().into_iter().map(|b| b.source_id).collect();
    assert_eq!(ids, vec!["x/a", "y"]);
  }

  #[test]
  fn binary_matching_two_filters_is_kept_once() {
    let inventory = Inventory::from_binaries(vec![ManagedBinary::new("/bin/a", "x/a", true)]);
    inventory.retain_prefixes(&["x".to_string(), "x/a".to_string()]);
    assert_eq!(inventory.len(), 1);
  }

  #[test]
  fn from_binaries_sorts_by_path() {
    let inventory = Inventory::from_binaries(vec![
      ManagedBinary::new("/b/foo", "pkg/foo", true),
      ManagedBinary::new("/a/foo", "pkg/foo", true),
    ]);
    let paths: Vec<_> = inventory.snapshot().into_iter().map(|b| b.path).collect();
    assert_eq!(paths, vec![PathBuf::from("/a/foo"), PathBuf::from("/b/foo")]);
  }

  #[test]
  fn record_updates_shared_handles() {
    let inventory = Inventory::from_binaries(vec![ManagedBinary::new("/bin/a", "x/a", false)]);
    let handle = inventory.clone();
    let err = Arc::new(UpdateError::NotWritable {
      path: PathBuf::from("/bin/a"),
    });

    let updated = handle.record(Path::new("/bin/a"), Some(err)).unwrap();
    assert!(updated.last_error().is_some());
    assert!(inventory.get(Path::new("/bin/a")).unwrap().last_error().is_some());
    assert!(handle.record(Path::new("/bin/missing"), None).is_none());
  }

  #[test]
  fn serializes_error_as_message() {
    let mut binary = ManagedBinary::new("/bin/a", "x/a", false);
    let json = serde_json::to_value(&binary).unwrap();
    assert_eq!(json["source_id"], "x/a");
    assert!(json.get("error").is_none());

    binary.last_error = Some(Arc::new(UpdateError::NotWritable {
      path: PathBuf::from("/bin/a"),
    }));
    let json = serde_json::to_value(&binary).unwrap();
    assert_eq!(json["error"], "/bin/a is not writable");
  }
}
