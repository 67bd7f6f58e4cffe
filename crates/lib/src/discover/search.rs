//! Classification of command-line style search arguments.

use std::collections::HashSet;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::DiscoverError;
use crate::classify::ExecutableCheck;
use crate::config::Config;
use crate::paths::search_paths;

/// Marker for the current working directory.
pub const CURRENT_DIR: &str = ".";

/// What to scan and how to filter, derived once from the arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSpec {
  /// Directories listed (non-recursively) for candidates.
  pub directories: Vec<PathBuf>,
  /// Executables resolved directly.
  pub explicit_executables: Vec<PathBuf>,
  /// Source-identifier prefixes; empty keeps everything.
  pub package_filters: Vec<String>,
}

fn push_unique<T: Clone + Eq + Hash>(items: &mut Vec<T>, seen: &mut HashSet<T>, item: T) {
  if seen.insert(item.clone()) {
    items.push(item);
  }
}

impl SearchSpec {
  /// Classify `args` against the process working directory and `PATH`.
  pub fn from_args(args: &[String], config: &Config) -> Self {
    let cwd = std::env::current_dir().ok();
    Self::classify(args, cwd.as_deref(), config.exec_check.as_ref(), |name| {
      which::which(name).ok()
    })
  }

  /// Classify each argument by the first matching rule:
  ///
  /// 1. `.` adds the working directory.
  /// 2. An argument containing a path separator that names an existing entry
  ///    adds that directory, or the containing directory of a file.
  /// 3. An executable-looking name that `lookup` resolves becomes an
  ///    explicit executable.
  /// 4. Anything else is a package filter.
  pub fn classify<F>(args: &[String], cwd: Option<&Path>, check: &dyn ExecutableCheck, lookup: F) -> Self
  where
    F: Fn(&str) -> Option<PathBuf>,
  {
    let mut spec = SearchSpec::default();
    let mut seen_dirs = HashSet::new();
    let mut seen_exes = HashSet::new();
    let mut seen_filters = HashSet::new();

    for arg in args {
      if arg == CURRENT_DIR {
        if let Some(cwd) = cwd {
          push_unique(&mut spec.directories, &mut seen_dirs, cwd.to_path_buf());
        }
        continue;
      }

      if arg.chars().any(std::path::is_separator)
        && let Ok(metadata) = std::fs::metadata(arg)
      {
        let path = absolute(Path::new(arg), cwd);
        let dir = if metadata.is_dir() {
          path
        } else {
          path.parent().map(Path::to_path_buf).unwrap_or(path)
        };
        push_unique(&mut spec.directories, &mut seen_dirs, dir);
        continue;
      }

      if check.looks_executable(arg)
        && let Some(exe) = lookup(arg)
      {
        push_unique(&mut spec.explicit_executables, &mut seen_exes, absolute(&exe, cwd));
        continue;
      }

      push_unique(&mut spec.package_filters, &mut seen_filters, arg.clone());
    }

    debug!(
      directories = spec.directories.len(),
      executables = spec.explicit_executables.len(),
      filters = spec.package_filters.len(),
      "classified search arguments"
    );
    spec
  }

  /// Whether neither directories nor executables were given.
  pub fn has_no_targets(&self) -> bool {
    self.directories.is_empty() && self.explicit_executables.is_empty()
  }

  /// Fall back to `defaults` when no targets were given.
  ///
  /// Fails when there is still nothing to scan.
  pub fn or_defaults(mut self, defaults: impl FnOnce() -> Vec<PathBuf>) -> Result<Self, DiscoverError> {
    if self.has_no_targets() {
      self.directories = defaults();
    }
    if self.has_no_targets() {
      return Err(DiscoverError::NoSearchPaths);
    }
    Ok(self)
  }

  /// [`SearchSpec::or_defaults`] using the configured default search paths.
  pub fn or_search_paths(self, config: &Config) -> Result<Self, DiscoverError> {
    self.or_defaults(|| search_paths(config))
  }
}

fn absolute(path: &Path, cwd: Option<&Path>) -> PathBuf {
  if path.is_absolute() {
    return path.to_path_buf();
  }
  match cwd {
    Some(cwd) => cwd.join(path),
    None => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
  }
}
