//! Partitioning of writable binaries by shared source.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::discover::ManagedBinary;

/// Writable binaries sharing one source identifier, rebuilt together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildGroup {
  source_id: String,
  members: Vec<PathBuf>,
}

impl BuildGroup {
  pub fn source_id(&self) -> &str {
    &self.source_id
  }

  /// Member paths in inventory order; never empty.
  pub fn members(&self) -> &[PathBuf] {
    &self.members
  }

  /// File name the rebuilt artifact is expected under, taken from the first member.
  pub fn artifact_name(&self) -> &OsStr {
    self.members[0].file_name().unwrap_or_else(|| self.members[0].as_os_str())
  }

  fn push(&mut self, path: &Path) {
    if !self.members.iter().any(|m| m == path) {
      self.members.push(path.to_path_buf());
    }
  }
}

/// Group writable binaries by source identifier, ordered by identifier.
///
/// Non-writable binaries are left out of every group.
pub fn group_by_source(binaries: &[ManagedBinary]) -> Vec<BuildGroup> {
  let mut groups: BTreeMap<&str, BuildGroup> = BTreeMap::new();
  for binary in binaries.iter().filter(|b| b.writable) {
    groups
      .entry(binary.source_id.as_str())
      .or_insert_with(|| BuildGroup {
        source_id: binary.source_id.clone(),
        members: Vec::new(),
      })
      .push(&binary.path);
  }
  groups.into_values().collect()
}
