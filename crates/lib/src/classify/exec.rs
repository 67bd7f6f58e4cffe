//! Executable-bit detection strategies.
//!
//! Two interchangeable strategies decide whether a regular file may be
//! executed by the current process:
//!
//! - [`PermissionBits`] (Unix): the POSIX owner/group/other execute bits
//!   checked against the process identity.
//! - [`ExtensionMatch`]: a fixed filename-extension match, for platforms
//!   without permission bits.
//!
//! [`default_check`] picks the one that fits the build target.

use std::ffi::OsStr;
use std::fmt;
use std::fs::Metadata;
use std::path::Path;
use std::sync::Arc;

/// Decides whether a file is executable and whether a bare name looks like one.
pub trait ExecutableCheck: fmt::Debug + Send + Sync {
  /// Whether the process may execute the file described by `metadata`.
  fn is_executable(&self, path: &Path, metadata: &Metadata) -> bool;

  /// Whether a bare command-line name plausibly refers to an executable.
  fn looks_executable(&self, name: &str) -> bool;
}

/// POSIX execute-permission rule.
///
/// Executable iff the "other" bit is set, or the "group" bit is set and the
/// file's group is the process group, or the "owner" bit is set and the file
/// is owned by the process user.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionBits {
  pub uid: u32,
  pub gid: u32,
}

#[cfg(unix)]
impl PermissionBits {
  const S_IXUSR: u32 = 0o100;
  const S_IXGRP: u32 = 0o010;
  const S_IXOTH: u32 = 0o001;

  pub fn new(uid: u32, gid: u32) -> Self {
    Self { uid, gid }
  }

  /// Identity of the running process.
  pub fn current() -> Self {
    Self {
      uid: rustix::process::geteuid().as_raw(),
      gid: rustix::process::getegid().as_raw(),
    }
  }

  /// The permission rule on raw mode bits and ownership.
  pub fn allows(&self, mode: u32, owner: u32, group: u32) -> bool {
    if mode & Self::S_IXOTH != 0 {
      return true;
    }
    (group == self.gid && mode & Self::S_IXGRP != 0) || (owner == self.uid && mode & Self::S_IXUSR != 0)
  }
}

#[cfg(unix)]
impl ExecutableCheck for PermissionBits {
  fn is_executable(&self, _path: &Path, metadata: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;

    self.allows(metadata.mode(), metadata.uid(), metadata.gid())
  }

  fn looks_executable(&self, name: &str) -> bool {
    Path::new(name).extension().is_none()
  }
}

/// Filename-extension rule (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionMatch {
  extensions: Vec<String>,
}

impl ExtensionMatch {
  pub fn new<I, S>(extensions: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      extensions: extensions.into_iter().map(|e| e.into().to_ascii_lowercase()).collect(),
    }
  }

  /// The `.exe` rule.
  pub fn exe() -> Self {
    Self::new(["exe"])
  }

  fn matches(&self, ext: Option<&OsStr>) -> bool {
    let Some(ext) = ext.and_then(OsStr::to_str) else {
      return false;
    };
    let ext = ext.to_ascii_lowercase();
    self.extensions.iter().any(|e| *e == ext)
  }
}

impl ExecutableCheck for ExtensionMatch {
  fn is_executable(&self, path: &Path, _metadata: &Metadata) -> bool {
    self.matches(path.extension())
  }

  fn looks_executable(&self, name: &str) -> bool {
    let ext = Path::new(name).extension();
    ext.is_none() || self.matches(ext)
  }
}

/// The strategy matching the build target.
#[cfg(unix)]
pub fn default_check() -> Arc<dyn ExecutableCheck> {
  Arc::new(PermissionBits::current())
}

/// The strategy matching the build target.
#[cfg(not(unix))]
pub fn default_check() -> Arc<dyn ExecutableCheck> {
  Arc::new(ExtensionMatch::exe())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[cfg(unix)]
  #[test]
  fn other_bit_is_enough() {
    let check = PermissionBits::new(1000, 1000);
    assert!(check.allows(0o001, 0, 0));
    assert!(!check.allows(0o644, 1000, 1000));
  }

  #[cfg(unix)]
  #[test]
  fn group_bit_requires_matching_group() {
    let check = PermissionBits::new(1000, 100);
    assert!(check.allows(0o010, 0, 100));
    assert!(!check.allows(0o010, 0, 200));
  }

  #[cfg(unix)]
  #[test]
  fn owner_bit_requires_matching_owner() {
    let check = PermissionBits::new(1000, 100);
    assert!(check.allows(0o700, 1000, 0));
    assert!(!check.allows(0o700, 1001, 0));
  }

  #[cfg(unix)]
  #[test]
  fn permission_bits_read_file_metadata() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tool");
    std::fs::write(&path, b"x").unwrap();
    let check = PermissionBits::current();

    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
    assert!(!check.is_executable(&path, &std::fs::metadata(&path).unwrap()));

    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o700)).unwrap();
    assert!(check.is_executable(&path, &std::fs::metadata(&path).unwrap()));
  }

  #[test]
  fn extension_match_is_case_insensitive() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("TOOL.EXE");
    std::fs::write(&path, b"x").unwrap();
    let metadata = std::fs::metadata(&path).unwrap();

    let check = ExtensionMatch::exe();
    assert!(check.is_executable(&path, &metadata));
    assert!(!check.is_executable(&temp.path().join("tool.txt"), &metadata));
  }

  #[test]
  fn extensionless_names_look_executable() {
    let check = ExtensionMatch::exe();
    assert!(check.looks_executable("gofmt"));
    assert!(check.looks_executable("gofmt.exe"));
    assert!(!check.looks_executable("github.com"));
  }
}
