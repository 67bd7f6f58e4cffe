//! Fetch and build actions run for each build group.
//!
//! A [`Toolchain`] fetches a source identifier and builds+installs it. Both
//! actions receive an [`EnvOverlay`] that points the build root and install
//! target into a throwaway workspace, and return the captured combined
//! output of the underlying process.

pub mod command;

use std::fmt;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

pub use command::CommandToolchain;

/// Environment redirections applied on top of the inherited environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvOverlay {
  /// Root the toolchain downloads and builds under.
  pub build_root: PathBuf,
  /// Directory installed executables land in.
  pub install_dir: PathBuf,
}

/// Which action failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
  Fetch,
  Install,
}

impl fmt::Display for ActionKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ActionKind::Fetch => write!(f, "fetch"),
      ActionKind::Install => write!(f, "install"),
    }
  }
}

/// The underlying reason an action failed.
#[derive(Debug, Error)]
pub enum ActionFailure {
  #[error("failed to spawn: {0}")]
  Spawn(#[source] io::Error),

  #[error("{0}")]
  Exit(ExitStatus),

  #[error("timed out after {0:?}")]
  TimedOut(Duration),
}

/// A failed fetch or install, carrying whatever the process printed.
#[derive(Debug, Error)]
#[error("{action} {source_id}: {failure}{}", indent_output(.output))]
pub struct ActionError {
  pub action: ActionKind,
  pub source_id: String,
  #[source]
  pub failure: ActionFailure,
  /// Combined stdout and stderr of the failed process.
  pub output: String,
}

impl ActionError {
  pub fn new(action: ActionKind, source_id: &str, failure: ActionFailure, output: String) -> Self {
    Self {
      action,
      source_id: source_id.to_string(),
      failure,
      output,
    }
  }
}

/// Output on its own tab-indented lines beneath the error message.
fn indent_output(output: &str) -> String {
  let output = output.trim_end();
  if output.is_empty() {
    return String::new();
  }
  format!("\n\t{}", output.replace('\n', "\n\t"))
}

/// External fetch and build+install actions.
pub trait Toolchain: Send + Sync + 'static {
  /// Download `source_id` into the overlay's build root.
  fn fetch(&self, source_id: &str, overlay: &EnvOverlay) -> impl Future<Output = Result<String, ActionError>> + Send;

  /// Build `source_id` and install its executable into the overlay's install dir.
  fn build_and_install(
    &self,
    source_id: &str,
    extra_args: &[String],
    overlay: &EnvOverlay,
  ) -> impl Future<Output = Result<String, ActionError>> + Send;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn output_is_indented_beneath_the_message() {
    let err = ActionError::new(
      ActionKind::Fetch,
      "pkg/foo",
      ActionFailure::TimedOut(Duration::from_secs(5)),
      "line one\nline two\n".to_string(),
    );
    assert_eq!(err.to_string(), "fetch pkg/foo: timed out after 5s\n\tline one\n\tline two");
  }

  #[test]
  fn empty_output_adds_nothing() {
    let err = ActionError::new(
      ActionKind::Install,
      "pkg/foo",
      ActionFailure::Spawn(io::Error::new(io::ErrorKind::NotFound, "no such file")),
      String::new(),
    );
    assert_eq!(err.to_string(), "install pkg/foo: failed to spawn: no such file");
  }
}
