//! Test utilities for rebin-lib.
//!
//! Fixture writers for fake executables, plus recording fakes for the
//! source-resolution and toolchain capabilities.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::Config;
use crate::discover::ManagedBinary;
use crate::resolve::{ResolveError, ResolvedSource, SourceResolver};
use crate::toolchain::{ActionError, ActionFailure, ActionKind, EnvOverlay, Toolchain};
use crate::update::UpdateError;

/// Leading bytes of a 64-bit little-endian ELF executable.
pub const ELF_STUB: &[u8] = b"\x7fELF\x02\x01\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\x02\x00\x3e\x00\x01\x00\x00\x00";

/// Write `content` to `dir/name` with the given permission bits.
#[cfg(unix)]
pub fn write_file_mode(dir: &Path, name: &str, content: &[u8], mode: u32) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join(name);
  std::fs::write(&path, content).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
  path
}

/// Write an executable owned by the current user.
#[cfg(unix)]
pub fn write_executable(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
  write_file_mode(dir, name, content, 0o755)
}

/// Configuration with a fixed pool size.
pub fn test_config(parallelism: usize) -> Config {
  let mut config = Config::detect();
  config.parallelism = parallelism;
  config
}

/// Exit status of a process that exited with code 1.
#[cfg(unix)]
pub fn failed_status() -> ExitStatus {
  use std::os::unix::process::ExitStatusExt;
  ExitStatus::from_raw(1 << 8)
}

#[cfg(windows)]
pub fn failed_status() -> ExitStatus {
  use std::os::windows::process::ExitStatusExt;
  ExitStatus::from_raw(1)
}

/// Resolver answering from a fixed table and recording every lookup.
#[derive(Debug, Default)]
pub struct FakeResolver {
  known: HashMap<PathBuf, ResolvedSource>,
  calls: Mutex<Vec<PathBuf>>,
}

impl FakeResolver {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, path: impl AsRef<Path>, resolved: ResolvedSource) -> Self {
    self.known.insert(path.as_ref().to_path_buf(), resolved);
    self
  }

  pub fn calls(&self) -> Vec<PathBuf> {
    self.calls.lock().unwrap().clone()
  }
}

impl SourceResolver for FakeResolver {
  async fn resolve(&self, path: &Path) -> Result<ResolvedSource, ResolveError> {
    self.calls.lock().unwrap().push(path.to_path_buf());
    self.known.get(path).cloned().ok_or_else(|| ResolveError::Unrecognized {
      path: path.to_path_buf(),
    })
  }
}

#[derive(Debug, Default)]
struct ToolchainCalls {
  fetches: Vec<String>,
  fetch_roots: Vec<PathBuf>,
  installs: Vec<String>,
  install_args: Vec<Vec<String>>,
}

/// Toolchain that "builds" canned artifacts named after the last source segment.
#[derive(Debug, Default)]
pub struct FakeToolchain {
  artifacts: HashMap<String, Vec<u8>>,
  fetch_failures: HashMap<String, String>,
  install_failures: HashMap<String, String>,
  delay: Option<Duration>,
  calls: Mutex<ToolchainCalls>,
}

impl FakeToolchain {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn artifact(mut self, source_id: &str, content: &[u8]) -> Self {
    self.artifacts.insert(source_id.to_string(), content.to_vec());
    self
  }

  pub fn fail_fetch(mut self, source_id: &str, output: &str) -> Self {
    self.fetch_failures.insert(source_id.to_string(), output.to_string());
    self
  }

  pub fn fail_install(mut self, source_id: &str, output: &str) -> Self {
    self.install_failures.insert(source_id.to_string(), output.to_string());
    self
  }

  /// Make every fetch take `delay`.
  pub fn delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  pub fn fetches(&self) -> Vec<String> {
    self.calls.lock().unwrap().fetches.clone()
  }

  pub fn fetch_roots(&self) -> Vec<PathBuf> {
    self.calls.lock().unwrap().fetch_roots.clone()
  }

  pub fn installs(&self) -> Vec<String> {
    self.calls.lock().unwrap().installs.clone()
  }

  pub fn install_args(&self) -> Vec<Vec<String>> {
    self.calls.lock().unwrap().install_args.clone()
  }
}

impl Toolchain for FakeToolchain {
  async fn fetch(&self, source_id: &str, overlay: &EnvOverlay) -> Result<String, ActionError> {
    {
      let mut calls = self.calls.lock().unwrap();
      calls.fetches.push(source_id.to_string());
      calls.fetch_roots.push(overlay.build_root.clone());
    }
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    match self.fetch_failures.get(source_id) {
      Some(output) => Err(ActionError::new(
        ActionKind::Fetch,
        source_id,
        ActionFailure::Exit(failed_status()),
        output.clone(),
      )),
      None => Ok(String::new()),
    }
  }

  async fn build_and_install(
    &self,
    source_id: &str,
    extra_args: &[String],
    overlay: &EnvOverlay,
  ) -> Result<String, ActionError> {
    {
      let mut calls = self.calls.lock().unwrap();
      calls.installs.push(source_id.to_string());
      calls.install_args.push(extra_args.to_vec());
    }
    if let Some(output) = self.install_failures.get(source_id) {
      return Err(ActionError::new(
        ActionKind::Install,
        source_id,
        ActionFailure::Exit(failed_status()),
        output.clone(),
      ));
    }
    if let Some(content) = self.artifacts.get(source_id) {
      let name = source_id.rsplit('/').next().unwrap_or(source_id);
      std::fs::write(overlay.install_dir.join(name), content).unwrap();
    }
    Ok(String::new())
  }
}

/// One recorded `report` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
  pub path: PathBuf,
  pub source_id: String,
  pub elapsed: Duration,
  pub error: Option<String>,
}

/// Collects report callbacks.
#[derive(Debug, Clone, Default)]
pub struct Reports {
  entries: Arc<Mutex<Vec<ReportEntry>>>,
}

impl Reports {
  pub fn sink(&self) -> impl Fn(&ManagedBinary, Duration, Option<&UpdateError>) + Send + Sync + 'static {
    let entries = self.entries.clone();
    move |binary, elapsed, error| {
      entries.lock().unwrap().push(ReportEntry {
        path: binary.path.clone(),
        source_id: binary.source_id.clone(),
        elapsed,
        error: error.map(|e| e.to_string()),
      });
    }
  }

  pub fn entries(&self) -> Vec<ReportEntry> {
    self.entries.lock().unwrap().clone()
  }
}
