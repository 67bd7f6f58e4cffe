//! Invocation-wide configuration.
//!
//! Everything that would otherwise be process-global state (home directory,
//! pool size, process identity) is resolved once into a [`Config`] and
//! passed explicitly to the search, discovery and update stages.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::classify::{ExecutableCheck, default_check};
use crate::platform::Platform;

/// Overrides the Go tool used for source resolution and rebuilds.
pub const GO_TOOL_ENV: &str = "REBIN_GO";

/// Raises the minimum worker-pool size.
pub const JOBS_ENV: &str = "REBIN_JOBS";

/// Prefix of per-group workspace directories.
pub const WORKSPACE_PREFIX: &str = "rebin";

/// Names of the path-list environment variables consulted for default search paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchVars {
  /// PATH-style list; entries kept only under the home directory.
  pub path: String,
  /// Secondary user-bin list; entries kept only under the home directory.
  pub user_bin: String,
  /// Workspace-root list; each root contributes its `bin` subdirectory.
  pub workspace_roots: String,
}

impl Default for SearchVars {
  fn default() -> Self {
    Self {
      path: "PATH".to_string(),
      user_bin: "GOBIN".to_string(),
      workspace_roots: "GOPATH".to_string(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct Config {
  /// Home directory of the invoking user, if it could be determined.
  pub home: Option<PathBuf>,
  /// Worker-pool size shared by discovery and update.
  pub parallelism: usize,
  /// Host platform; binaries built for another platform are rejected.
  pub host: Platform,
  pub search_vars: SearchVars,
  pub exec_check: Arc<dyn ExecutableCheck>,
  /// Go tool used by the bundled resolver and toolchain.
  pub go_tool: OsString,
  /// Parent directory for workspaces; the system temp dir when `None`.
  pub workspace_parent: Option<PathBuf>,
  pub workspace_prefix: String,
  /// Upper bound for a single fetch or build action. `None` waits forever.
  pub action_timeout: Option<Duration>,
}

impl Config {
  /// Resolve the configuration from the current process and environment.
  pub fn detect() -> Self {
    let min_parallelism = match std::env::var(JOBS_ENV) {
      Ok(value) => value.parse().unwrap_or_else(|_| {
        warn!(var = JOBS_ENV, value = %value, "ignoring invalid job count");
        1
      }),
      Err(_) => 1,
    };

    Self {
      home: dirs::home_dir(),
      parallelism: pool_size(min_parallelism),
      host: Platform::current(),
      search_vars: SearchVars::default(),
      exec_check: default_check(),
      go_tool: std::env::var_os(GO_TOOL_ENV).unwrap_or_else(|| OsString::from("go")),
      workspace_parent: None,
      workspace_prefix: WORKSPACE_PREFIX.to_string(),
      action_timeout: None,
    }
  }

  /// Raise the pool size to at least `min`.
  pub fn with_min_parallelism(mut self, min: usize) -> Self {
    self.parallelism = self.parallelism.max(min);
    self
  }

  pub fn with_action_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.action_timeout = timeout;
    self
  }
}

/// max(available parallelism, `min`), never zero.
pub fn pool_size(min: usize) -> usize {
  let available = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
  available.max(min).max(1)
}
