//! Types for the update pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::toolchain::ActionError;

/// Why a binary was not replaced.
#[derive(Debug, Error)]
pub enum UpdateError {
  /// The group's workspace could not be created.
  #[error("failed to create workspace: {0}")]
  Workspace(#[source] io::Error),

  /// Fetching or building the group's source failed.
  #[error(transparent)]
  Action(#[from] ActionError),

  /// The rebuilt artifact could not be copied over this binary.
  #[error("failed to copy {artifact} to {path}: {source}")]
  Copy {
    path: PathBuf,
    artifact: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The binary cannot be replaced in place and was left alone.
  #[error("{path} is not writable")]
  NotWritable { path: PathBuf },
}

/// Options for [`update`](super::update).
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
  /// Extra arguments passed to the build+install action.
  pub extra_args: Vec<String>,
  /// Report non-writable binaries as skipped instead of staying silent.
  pub report_skipped: bool,
}

/// Counts of what an update run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
  /// Build groups processed, one fetch+build each.
  pub groups: usize,
  pub updated: usize,
  pub failed: usize,
  /// Non-writable binaries left out of every group.
  pub skipped: usize,
}

impl UpdateSummary {
  pub fn is_success(&self) -> bool {
    self.failed == 0
  }
}
