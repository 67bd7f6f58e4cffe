//! Default search directories.
//!
//! PATH-style and user-bin entries are only trusted when they live under the
//! user's home directory; scanning system directories is off limits. Each
//! workspace root contributes its `bin` subdirectory when that exists.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::config::Config;

/// Derive the deduplicated default search directories from the environment.
pub fn search_paths(config: &Config) -> Vec<PathBuf> {
  let vars = &config.search_vars;
  search_paths_from(
    config.home.as_deref(),
    std::env::var_os(&vars.path).as_deref(),
    std::env::var_os(&vars.user_bin).as_deref(),
    std::env::var_os(&vars.workspace_roots).as_deref(),
  )
}

/// [`search_paths`] over explicit variable values.
pub fn search_paths_from(
  home: Option<&Path>,
  path: Option<&OsStr>,
  user_bin: Option<&OsStr>,
  workspace_roots: Option<&OsStr>,
) -> Vec<PathBuf> {
  let mut dirs = Vec::new();
  let mut seen = HashSet::new();
  let mut push = |dir: PathBuf| {
    if seen.insert(dir.clone()) {
      dirs.push(dir);
    }
  };

  match home {
    Some(home) => {
      for list in [path, user_bin] {
        split_absolute(list)
          .into_iter()
          .filter(|dir| dir.starts_with(home))
          .for_each(&mut push);
      }
    }
    None => debug!("home directory unknown, skipping PATH entries"),
  }

  split_absolute(workspace_roots)
    .into_iter()
    .map(|root| root.join("bin"))
    .filter(|bin| bin.is_dir())
    .for_each(&mut push);

  dirs
}

/// Split a path list and make each non-empty entry absolute.
///
/// Relative entries are resolved against the current directory before any
/// home check, so `bin` run from inside the home directory counts as under it.
fn split_absolute(list: Option<&OsStr>) -> Vec<PathBuf> {
  let Some(list) = list else {
    return Vec::new();
  };
  std::env::split_paths(list)
    .filter(|p| !p.as_os_str().is_empty())
    .filter_map(|p| std::path::absolute(&p).ok())
    .map(|p| normalize(dunce::simplified(&p)))
    .collect()
}

/// Drop `.` and fold `..` lexically; `absolute` keeps `..` on unix.
fn normalize(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        out.pop();
      }
      other => out.push(other),
    }
  }
  out
}
