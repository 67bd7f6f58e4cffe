//! Source resolution for compiled binaries.
//!
//! A [`SourceResolver`] inspects a binary and reports the identifier of the
//! package it was built from, plus the platform it was built for when the
//! binary records one.

pub mod go;

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::platform::Platform;

pub use go::GoBuildInfoResolver;

/// What a resolver learned about a binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
  pub source_id: String,
  /// Target platform recorded in the binary, if any.
  pub platform: Option<Platform>,
}

impl ResolvedSource {
  pub fn new(source_id: impl Into<String>) -> Self {
    Self {
      source_id: source_id.into(),
      platform: None,
    }
  }

  pub fn with_platform(mut self, platform: Platform) -> Self {
    self.platform = Some(platform);
    self
  }
}

/// Why a candidate could not be matched to a source.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// The binary carries no recognizable source information.
  #[error("{path}: no source information found")]
  Unrecognized { path: PathBuf },

  /// The binary targets a platform other than the host.
  #[error("{path}: built for {found}, host is {host} (cross-compiled binaries are not supported)")]
  PlatformMismatch {
    path: PathBuf,
    found: Platform,
    host: Platform,
  },

  /// The inspection tool could not be run.
  #[error("failed to run {tool}: {source}")]
  Tool {
    tool: String,
    #[source]
    source: io::Error,
  },
}

/// Capability that maps a binary to its originating source identifier.
pub trait SourceResolver: Send + Sync + 'static {
  fn resolve(&self, path: &Path) -> impl Future<Output = Result<ResolvedSource, ResolveError>> + Send;
}

/// Resolve `path` and reject binaries built for a platform other than `host`.
pub async fn resolve_for_host<R: SourceResolver>(
  resolver: &R,
  path: &Path,
  host: &Platform,
) -> Result<String, ResolveError> {
  let resolved = resolver.resolve(path).await?;
  if let Some(found) = resolved.platform
    && found != *host
  {
    return Err(ResolveError::PlatformMismatch {
      path: path.to_path_buf(),
      found,
      host: host.clone(),
    });
  }
  Ok(resolved.source_id)
}
