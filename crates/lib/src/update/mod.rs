//! In-place rebuilds of managed binaries.
//!
//! This module provides the update pipeline. It:
//! 1. Groups writable binaries by source identifier
//! 2. Runs a bounded pool of workers over the groups
//! 3. For each group, fetches and builds the source once in a fresh workspace
//! 4. Copies the artifact over every member and reports each binary once
//!
//! A failing group marks all of its members and never affects other groups.
//! A failing copy only marks the one binary it was meant for.

pub mod group;
pub mod source;
pub mod types;
pub mod workspace;

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::discover::{Inventory, ManagedBinary};
use crate::toolchain::{ActionError, ActionFailure, ActionKind, Toolchain};

pub use group::{BuildGroup, group_by_source};
pub use source::{SourceOutcome, fetch_sources};
pub use types::{UpdateError, UpdateOptions, UpdateSummary};
pub use workspace::Workspace;

/// Shared state handed to every update worker.
struct UpdateContext<T, F> {
  inventory: Inventory,
  toolchain: Arc<T>,
  report: F,
  extra_args: Vec<String>,
  action_timeout: Option<Duration>,
  workspace_parent: Option<PathBuf>,
  workspace_prefix: String,
}

impl<T, F> UpdateContext<T, F>
where
  T: Toolchain,
  F: Fn(&ManagedBinary, Duration, Option<&UpdateError>) + Send + Sync + 'static,
{
  /// Record the outcome for `path` and report it.
  fn finish(&self, path: &Path, started: Instant, error: Option<Arc<UpdateError>>) {
    match self.inventory.record(path, error) {
      Some(binary) => (self.report)(&binary, started.elapsed(), binary.last_error()),
      None => warn!(path = ?path, "binary vanished from inventory"),
    }
  }

  /// Give every member of `group` the same error.
  fn fail_group(&self, group: &BuildGroup, started: Instant, error: UpdateError) -> GroupOutcome {
    warn!(source = %group.source_id(), error = %error, "group failed");
    let error = Arc::new(error);
    for path in group.members() {
      self.finish(path, started, Some(error.clone()));
    }
    GroupOutcome {
      updated: 0,
      failed: group.members().len(),
    }
  }

  async fn process(&self, group: &BuildGroup) -> GroupOutcome {
    let started = Instant::now();
    let source_id = group.source_id();
    info!(source = %source_id, members = group.members().len(), "rebuilding group");

    let workspace = match Workspace::create(self.workspace_parent.as_deref(), &self.workspace_prefix) {
      Ok(workspace) => workspace,
      Err(e) => return self.fail_group(group, started, UpdateError::Workspace(e)),
    };
    let overlay = workspace.overlay();

    let fetched = with_timeout(
      self.action_timeout,
      ActionKind::Fetch,
      source_id,
      self.toolchain.fetch(source_id, &overlay),
    )
    .await;
    if let Err(e) = fetched {
      workspace.close();
      return self.fail_group(group, started, e.into());
    }

    let built = with_timeout(
      self.action_timeout,
      ActionKind::Install,
      source_id,
      self.toolchain.build_and_install(source_id, &self.extra_args, &overlay),
    )
    .await;
    if let Err(e) = built {
      workspace.close();
      return self.fail_group(group, started, e.into());
    }

    let artifact = workspace.bin_dir().join(group.artifact_name());
    let mut outcome = GroupOutcome::default();
    for path in group.members() {
      match copy_artifact(&artifact, path).await {
        Ok(bytes) => {
          debug!(path = ?path, bytes, "replaced binary");
          outcome.updated += 1;
          self.finish(path, started, None);
        }
        Err(source) => {
          warn!(path = ?path, error = %source, "failed to replace binary");
          outcome.failed += 1;
          let error = UpdateError::Copy {
            path: path.clone(),
            artifact: artifact.clone(),
            source,
          };
          self.finish(path, started, Some(Arc::new(error)));
        }
      }
    }

    workspace.close();
    info!(source = %source_id, elapsed = ?started.elapsed(), "group done");
    outcome
  }
}

#[derive(Debug, Default, Clone, Copy)]
struct GroupOutcome {
  updated: usize,
  failed: usize,
}

/// Rebuild every writable binary in `inventory` from its source.
///
/// `report` is called exactly once per attempted binary with the time
/// elapsed since its group started and the error, if any. Non-writable
/// binaries are only reported when `options.report_skipped` is set.
pub async fn update<T, F>(
  inventory: &Inventory,
  toolchain: Arc<T>,
  config: &Config,
  options: &UpdateOptions,
  report: F,
) -> UpdateSummary
where
  T: Toolchain,
  F: Fn(&ManagedBinary, Duration, Option<&UpdateError>) + Send + Sync + 'static,
{
  let binaries = inventory.snapshot();
  let groups = group_by_source(&binaries);
  let ctx = Arc::new(UpdateContext {
    inventory: inventory.clone(),
    toolchain,
    report,
    extra_args: options.extra_args.clone(),
    action_timeout: config.action_timeout,
    workspace_parent: config.workspace_parent.clone(),
    workspace_prefix: config.workspace_prefix.clone(),
  });

  let mut summary = UpdateSummary {
    groups: groups.len(),
    ..Default::default()
  };

  for binary in binaries.iter().filter(|b| !b.writable) {
    summary.skipped += 1;
    if options.report_skipped {
      let error = UpdateError::NotWritable {
        path: binary.path.clone(),
      };
      ctx.finish(&binary.path, Instant::now(), Some(Arc::new(error)));
    }
  }

  if groups.is_empty() {
    info!(skipped = summary.skipped, "nothing to update");
    return summary;
  }

  let workers = config.parallelism.min(groups.len()).max(1);
  info!(groups = groups.len(), workers, "starting update");

  let (tx, rx) = mpsc::channel::<BuildGroup>(groups.len());
  for group in groups {
    // Capacity covers every group, so this never waits.
    if tx.send(group).await.is_err() {
      break;
    }
  }
  drop(tx);
  let rx = Arc::new(Mutex::new(rx));

  let mut join_set = JoinSet::new();
  for _ in 0..workers {
    let rx = rx.clone();
    let ctx = ctx.clone();
    join_set.spawn(async move {
      let mut total = GroupOutcome::default();
      loop {
        let next = rx.lock().await.recv().await;
        let Some(group) = next else {
          break;
        };
        let outcome = ctx.process(&group).await;
        total.updated += outcome.updated;
        total.failed += outcome.failed;
      }
      total
    });
  }

  while let Some(joined) = join_set.join_next().await {
    match joined {
      Ok(outcome) => {
        summary.updated += outcome.updated;
        summary.failed += outcome.failed;
      }
      Err(e) => error!(error = %e, "update worker panicked"),
    }
  }

  info!(
    updated = summary.updated,
    failed = summary.failed,
    skipped = summary.skipped,
    "update complete"
  );
  summary
}

/// Await `action`, failing it with a timeout error once `limit` passes.
pub(crate) async fn with_timeout<Fut>(
  limit: Option<Duration>,
  action: ActionKind,
  source_id: &str,
  future: Fut,
) -> Result<String, ActionError>
where
  Fut: Future<Output = Result<String, ActionError>>,
{
  let Some(limit) = limit else {
    return future.await;
  };
  match tokio::time::timeout(limit, future).await {
    Ok(result) => result,
    Err(_) => Err(ActionError::new(
      action,
      source_id,
      ActionFailure::TimedOut(limit),
      String::new(),
    )),
  }
}

/// Overwrite `dest` with the full content of `artifact`.
async fn copy_artifact(artifact: &Path, dest: &Path) -> io::Result<u64> {
  let mut src = tokio::fs::File::open(artifact).await?;
  let mut dst = tokio::fs::File::create(dest).await?;
  let bytes = tokio::io::copy(&mut src, &mut dst).await?;
  dst.flush().await?;
  Ok(bytes)
}
