//! Mirroring the sources of discovered binaries into a build root.

use std::collections::BTreeSet;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use super::with_timeout;
use crate::config::Config;
use crate::discover::Inventory;
use crate::toolchain::{ActionError, ActionKind, EnvOverlay, Toolchain};

/// Result of fetching one source identifier.
#[derive(Debug)]
pub struct SourceOutcome {
  pub source_id: String,
  pub result: Result<String, ActionError>,
}

/// Fetch every distinct source in `inventory` into `root`.
///
/// Unlike [`update`](super::update), writability is irrelevant: nothing is
/// replaced. Outcomes are ordered by source identifier.
pub async fn fetch_sources<T: Toolchain>(
  inventory: &Inventory,
  toolchain: Arc<T>,
  config: &Config,
  root: &Path,
) -> io::Result<Vec<SourceOutcome>> {
  let sources: BTreeSet<String> = inventory.snapshot().into_iter().map(|b| b.source_id).collect();
  std::fs::create_dir_all(root)?;
  let overlay = EnvOverlay {
    build_root: root.to_path_buf(),
    install_dir: root.join("bin"),
  };
  info!(sources = sources.len(), root = ?root, "fetching sources");

  let semaphore = Arc::new(Semaphore::new(config.parallelism.max(1)));
  let mut join_set = JoinSet::new();
  for source_id in sources {
    let toolchain = toolchain.clone();
    let overlay = overlay.clone();
    let semaphore = semaphore.clone();
    let limit = config.action_timeout;

    join_set.spawn(async move {
      let _permit = semaphore.acquire_owned().await;
      let result = with_timeout(
        limit,
        ActionKind::Fetch,
        &source_id,
        toolchain.fetch(&source_id, &overlay),
      )
      .await;
      SourceOutcome { source_id, result }
    });
  }

  let mut outcomes = Vec::new();
  while let Some(joined) = join_set.join_next().await {
    match joined {
      Ok(outcome) => outcomes.push(outcome),
      Err(e) => error!(error = %e, "fetch task panicked"),
    }
  }
  outcomes.sort_by(|a, b| a.source_id.cmp(&b.source_id));
  Ok(outcomes)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::discover::ManagedBinary;
  use crate::util::testutil::{FakeToolchain, test_config};
  use tempfile::TempDir;

  #[tokio::test]
  async fn each_source_is_fetched_once_into_root() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("mirror");
    let inventory = Inventory::from_binaries(vec![
      ManagedBinary::new("/a/foo", "pkg/foo", true),
      ManagedBinary::new("/b/foo", "pkg/foo", false),
      ManagedBinary::new("/a/bar", "pkg/bar", false),
    ]);
    let toolchain = Arc::new(FakeToolchain::new().fail_fetch("pkg/bar", "no such repo"));

    let outcomes = fetch_sources(&inventory, toolchain.clone(), &test_config(4), &root)
      .await
      .unwrap();

    assert!(root.is_dir());
    let ids: Vec<_> = outcomes.iter().map(|o| o.source_id.as_str()).collect();
    assert_eq!(ids, vec!["pkg/bar", "pkg/foo"]);
    assert!(outcomes[0].result.is_err());
    assert!(outcomes[1].result.is_ok());
    assert_eq!(toolchain.fetch_roots(), vec![root.clone(), root]);
    assert!(toolchain.installs().is_empty());
  }
}
