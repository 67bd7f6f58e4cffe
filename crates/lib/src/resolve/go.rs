//! Resolver backed by the build information Go embeds in its binaries.
//!
//! `go version -m <file>` prints the main package path and the build
//! settings:
//!
//! ```text
//! /home/user/go/bin/gopls: go1.22.1
//! 	path	golang.org/x/tools/gopls
//! 	mod	golang.org/x/tools/gopls	v0.15.2	h1:...
//! 	build	GOOS=linux
//! 	build	GOARCH=amd64
//! ```

use std::ffi::OsString;
use std::path::Path;

use tokio::process::Command;
use tracing::debug;

use super::{ResolveError, ResolvedSource, SourceResolver};
use crate::platform::Platform;

#[derive(Debug, Clone)]
pub struct GoBuildInfoResolver {
  go: OsString,
}

impl GoBuildInfoResolver {
  pub fn new(go: impl Into<OsString>) -> Self {
    Self { go: go.into() }
  }
}

impl SourceResolver for GoBuildInfoResolver {
  async fn resolve(&self, path: &Path) -> Result<ResolvedSource, ResolveError> {
    let output = Command::new(&self.go)
      .arg("version")
      .arg("-m")
      .arg(path)
      .kill_on_drop(true)
      .output()
      .await
      .map_err(|source| ResolveError::Tool {
        tool: self.go.to_string_lossy().into_owned(),
        source,
      })?;

    if !output.status.success() {
      debug!(path = ?path, stderr = %String::from_utf8_lossy(&output.stderr).trim(), "no build info");
      return Err(ResolveError::Unrecognized {
        path: path.to_path_buf(),
      });
    }

    parse_build_info(path, &String::from_utf8_lossy(&output.stdout))
  }
}

/// Extract the main package and target platform from `go version -m` output.
pub fn parse_build_info(path: &Path, text: &str) -> Result<ResolvedSource, ResolveError> {
  let mut source_id = None;
  let mut goos = None;
  let mut goarch = None;

  for line in text.lines() {
    let mut fields = line.trim_start().splitn(2, '\t');
    match (fields.next(), fields.next()) {
      (Some("path"), Some(value)) => source_id = Some(value.trim().to_string()),
      (Some("build"), Some(setting)) => match setting.trim().split_once('=') {
        Some(("GOOS", value)) => goos = Some(value.to_string()),
        Some(("GOARCH", value)) => goarch = Some(value.to_string()),
        _ => {}
      },
      _ => {}
    }
  }

  let Some(source_id) = source_id.filter(|id| !id.is_empty()) else {
    return Err(ResolveError::Unrecognized {
      path: path.to_path_buf(),
    });
  };
  let mut resolved = ResolvedSource::new(source_id);

  if let (Some(os), Some(arch)) = (goos, goarch) {
    resolved = resolved.with_platform(Platform::parse(&os, &arch));
  }

  Ok(resolved)
}
