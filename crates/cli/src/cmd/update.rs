//! Implementation of the `rebin update` command.
//!
//! Rebuilds every writable managed binary from its source and copies the
//! result over the original. One line is printed per binary as soon as its
//! group finishes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use tracing::debug;

use rebin_lib::toolchain::CommandToolchain;
use rebin_lib::{Config, Inventory, UpdateOptions, update};

use crate::output::{format_duration, print_info, print_update_outcome, print_warning};

/// Flags accepted by `rebin update`.
#[derive(Debug, Default)]
pub struct UpdateFlags {
  pub ldflags: Option<String>,
  pub jobs: Option<usize>,
  pub timeout: Option<Duration>,
  pub report_skipped: bool,
}

impl UpdateFlags {
  fn install_args(&self) -> Vec<String> {
    match &self.ldflags {
      Some(flags) if !flags.is_empty() => vec![format!("-ldflags={}", flags)],
      _ => Vec::new(),
    }
  }
}

/// Execute the update command.
///
/// # Errors
///
/// Returns an error if discovery finds nothing to search or any binary
/// failed to update.
pub fn cmd_update(args: &[String], flags: UpdateFlags) -> Result<()> {
  let start = Instant::now();
  let config = Config::detect()
    .with_min_parallelism(flags.jobs.unwrap_or(1))
    .with_action_timeout(flags.timeout);
  let rt = super::runtime()?;
  let inventory = super::discover_binaries(&rt, args, &config)?;
  exclude_self(&inventory);

  if inventory.is_empty() {
    print_warning("No managed binaries found");
    return Ok(());
  }

  let toolchain = Arc::new(CommandToolchain::go(config.go_tool.clone()));
  let options = UpdateOptions {
    extra_args: flags.install_args(),
    report_skipped: flags.report_skipped,
  };
  let summary = rt.block_on(update(&inventory, toolchain, &config, &options, print_update_outcome));

  print_info(&format!(
    "{} updated, {} failed, {} skipped in {}",
    summary.updated,
    summary.failed,
    summary.skipped,
    format_duration(start.elapsed())
  ));

  if !summary.is_success() {
    bail!("{} binaries failed to update", summary.failed);
  }
  Ok(())
}

/// Drop the running executable from `inventory` so it is never overwritten mid-run.
fn exclude_self(inventory: &Inventory) {
  let Some(me) = std::env::current_exe().ok().and_then(|p| dunce::canonicalize(p).ok()) else {
    return;
  };
  for binary in inventory.snapshot() {
    if dunce::canonicalize(&binary.path).is_ok_and(|p| p == me) {
      debug!(path = ?binary.path, "excluding running executable");
      inventory.remove(&binary.path);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rebin_lib::ManagedBinary;

  #[test]
  fn ldflags_become_one_install_argument() {
    let flags = UpdateFlags {
      ldflags: Some("-w -s".to_string()),
      ..Default::default()
    };
    assert_eq!(flags.install_args(), vec!["-ldflags=-w -s".to_string()]);
  }

  #[test]
  fn empty_ldflags_are_ignored() {
    let flags = UpdateFlags {
      ldflags: Some(String::new()),
      ..Default::default()
    };
    assert!(flags.install_args().is_empty());
    assert!(UpdateFlags::default().install_args().is_empty());
  }

  #[test]
  fn running_executable_is_excluded() {
    let me = std::env::current_exe().unwrap();
    let inventory = Inventory::from_binaries(vec![
      ManagedBinary::new(&me, "pkg/rebin", true),
      ManagedBinary::new("/nonexistent/other", "pkg/other", true),
    ]);

    exclude_self(&inventory);

    assert_eq!(inventory.len(), 1);
    assert!(inventory.get(&me).is_none());
  }
}
