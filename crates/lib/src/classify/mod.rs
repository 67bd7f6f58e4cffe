//! Classification of filesystem entries.
//!
//! A managed-binary candidate is a regular file that the process may execute
//! and whose leading bytes do not sniff as plain text.

pub mod exec;
pub mod probe;
pub mod sniff;

use std::fs::Metadata;
use std::path::Path;

#[cfg(unix)]
pub use exec::PermissionBits;
pub use exec::{ExecutableCheck, ExtensionMatch, default_check};
pub use probe::can_write;
pub use sniff::{ContentKind, is_binary, sniff};

/// Whether the entry is a regular file the process may execute.
pub fn is_candidate_executable(check: &dyn ExecutableCheck, path: &Path, metadata: &Metadata) -> bool {
  metadata.is_file() && check.is_executable(path, metadata)
}

/// Whether the entry is a plausible compiled executable.
pub fn is_compiled_executable(check: &dyn ExecutableCheck, path: &Path, metadata: &Metadata) -> bool {
  is_candidate_executable(check, path, metadata) && is_binary(path)
}
