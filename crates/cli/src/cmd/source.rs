//! Implementation of the `rebin source` command.
//!
//! Fetches the sources of every discovered binary into a workspace root,
//! producing a mirror that holds only what those binaries were built from.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use rebin_lib::toolchain::CommandToolchain;
use rebin_lib::{Config, fetch_sources};

use crate::output::{print_error, print_success, print_warning};

/// Marker for "the first entry of the current workspace-root list".
const CURRENT_ROOT: &str = ".";

pub fn cmd_source(dir: &Path, args: &[String]) -> Result<()> {
  let config = Config::detect();
  let root = target_root(dir, &config)?;
  let rt = super::runtime()?;
  let inventory = super::discover_binaries(&rt, args, &config)?;

  if inventory.is_empty() {
    print_warning("No managed binaries found");
    return Ok(());
  }

  let toolchain = Arc::new(CommandToolchain::go(config.go_tool.clone()));
  let outcomes = rt
    .block_on(fetch_sources(&inventory, toolchain, &config, &root))
    .with_context(|| format!("Failed to prepare {}", root.display()))?;

  let mut failed = 0;
  for outcome in &outcomes {
    match &outcome.result {
      Ok(_) => print_success(&outcome.source_id),
      Err(e) => {
        failed += 1;
        print_error(&e.to_string());
      }
    }
  }
  if failed > 0 {
    bail!("{} of {} sources could not be fetched", failed, outcomes.len());
  }
  Ok(())
}

fn target_root(dir: &Path, config: &Config) -> Result<PathBuf> {
  if dir != Path::new(CURRENT_ROOT) {
    return Ok(dir.to_path_buf());
  }
  let var = &config.search_vars.workspace_roots;
  std::env::var_os(var)
    .and_then(|value| std::env::split_paths(&value).find(|p| !p.as_os_str().is_empty()))
    .with_context(|| format!("unable to read current ${} or ${} is empty", var, var))
}
