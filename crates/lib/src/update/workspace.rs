//! Ephemeral per-group build workspaces.
//!
//! Toolchains may leave write-protected trees behind (Go's module cache is
//! read-only), so removal restores write permission on the whole tree and
//! retries when a plain recursive delete fails.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::toolchain::EnvOverlay;

/// A throwaway build root with a `bin` subdirectory.
///
/// The directory tree is deleted when the workspace is dropped, whichever
/// way the group's work ended.
#[derive(Debug)]
pub struct Workspace {
  root: PathBuf,
  bin_dir: PathBuf,
}

impl Workspace {
  /// Create a fresh workspace under `parent`, or the system temp dir.
  pub fn create(parent: Option<&Path>, prefix: &str) -> io::Result<Self> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(prefix);
    let dir = match parent {
      Some(parent) => builder.tempdir_in(parent)?,
      None => builder.tempdir()?,
    };
    let bin_dir = dir.path().join("bin");
    std::fs::create_dir(&bin_dir)?;
    let root = dir.keep();
    debug!(root = ?root, "created workspace");
    Ok(Self { root, bin_dir })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn bin_dir(&self) -> &Path {
    &self.bin_dir
  }

  /// Overlay pointing the build root here and the install target at `bin`.
  pub fn overlay(&self) -> EnvOverlay {
    EnvOverlay {
      build_root: self.root.clone(),
      install_dir: self.bin_dir.clone(),
    }
  }

  /// Delete the workspace now.
  pub fn close(self) {
    drop(self);
  }
}

impl Drop for Workspace {
  fn drop(&mut self) {
    if let Err(e) = remove_tree(&self.root) {
      warn!(root = ?self.root, error = %e, "failed to remove workspace");
    }
  }
}

/// Recursively delete `path`, restoring write permission if needed.
fn remove_tree(path: &Path) -> io::Result<()> {
  match std::fs::remove_dir_all(path) {
    Ok(()) => return Ok(()),
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
    Err(e) => debug!(root = ?path, error = %e, "retrying removal with write permission restored"),
  }
  make_writable(path);
  std::fs::remove_dir_all(path)
}

/// Grant the owner write permission on every entry under `path`.
fn make_writable(path: &Path) {
  // Directories first so their contents can be reached.
  for entry in WalkDir::new(path).into_iter().filter_map(Result::ok) {
    if entry.path_is_symlink() {
      continue;
    }
    if let Err(e) = make_entry_writable(entry.path()) {
      warn!(path = ?entry.path(), error = %e, "failed to make writable, continuing");
    }
  }
}

#[cfg(unix)]
fn make_entry_writable(path: &Path) -> io::Result<()> {
  use std::os::unix::fs::PermissionsExt;

  let mut perms = std::fs::metadata(path)?.permissions();
  perms.set_mode(perms.mode() | 0o700);
  std::fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn make_entry_writable(path: &Path) -> io::Result<()> {
  let mut perms = std::fs::metadata(path)?.permissions();
  #[allow(clippy::permissions_set_readonly_false)]
  perms.set_readonly(false);
  std::fs::set_permissions(path, perms)
}
