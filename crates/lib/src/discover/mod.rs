//! Discovery of managed binaries.
//!
//! Turns search arguments into an [`Inventory`]:
//! - Arguments are classified into directories, explicit executables and
//!   package filters ([`SearchSpec`]), falling back to the default search paths
//! - Producers list each directory (one level deep) and queue every compiled
//!   executable, probing writability once per directory
//! - A bounded pool of workers resolves each queued candidate's source;
//!   candidates that fail to resolve are dropped
//! - The result is filtered by package prefix and sorted by path

pub mod search;
pub mod types;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::classify::{ExecutableCheck, can_write, is_compiled_executable};
use crate::config::Config;
use crate::resolve::{SourceResolver, resolve_for_host};

pub use search::SearchSpec;
pub use types::{DiscoverError, Inventory, ManagedBinary};

/// Capacity of the candidate queue between producers and workers.
const QUEUE_CAPACITY: usize = 128;

/// A file waiting for source resolution.
#[derive(Debug)]
struct Candidate {
  path: PathBuf,
  writable: bool,
}

/// Sending half of the candidate queue. A path is queued at most once, even
/// when it is both listed explicitly and found in a searched directory.
#[derive(Clone)]
struct Queue {
  tx: mpsc::Sender<Candidate>,
  queued: Arc<std::sync::Mutex<HashSet<PathBuf>>>,
}

impl Queue {
  fn new(tx: mpsc::Sender<Candidate>) -> Self {
    Self {
      tx,
      queued: Arc::new(std::sync::Mutex::new(HashSet::new())),
    }
  }

  /// Queue `candidate` unless its path was already queued. Returns `false`
  /// once the workers are gone.
  fn push(&self, candidate: Candidate) -> bool {
    let fresh = self
      .queued
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(candidate.path.clone());
    if !fresh {
      debug!(path = ?candidate.path, "already queued");
      return true;
    }
    self.tx.blocking_send(candidate).is_ok()
  }
}

/// Discover managed binaries for `args`.
///
/// Fails only when there is nothing to search.
pub async fn discover<R: SourceResolver>(
  args: &[String],
  config: &Config,
  resolver: Arc<R>,
) -> Result<Inventory, DiscoverError> {
  let spec = SearchSpec::from_args(args, config).or_search_paths(config)?;
  Ok(scan(spec, config, resolver).await)
}

/// Run the discovery pool over an already classified [`SearchSpec`].
pub async fn scan<R: SourceResolver>(spec: SearchSpec, config: &Config, resolver: Arc<R>) -> Inventory {
  info!(
    directories = spec.directories.len(),
    executables = spec.explicit_executables.len(),
    workers = config.parallelism,
    "starting discovery"
  );

  let inventory = Inventory::new();
  let (tx, rx) = mpsc::channel::<Candidate>(QUEUE_CAPACITY);
  let rx = Arc::new(Mutex::new(rx));
  let queue = Queue::new(tx);

  let mut producers = JoinSet::new();
  for path in spec.explicit_executables {
    let queue = queue.clone();
    producers.spawn_blocking(move || {
      let writable = can_write(&path);
      queue.push(Candidate { path, writable });
    });
  }
  for dir in spec.directories {
    let queue = queue.clone();
    let check = config.exec_check.clone();
    producers.spawn_blocking(move || list_directory(&dir, check.as_ref(), &queue));
  }
  // Workers stop once every producer has dropped its sender.
  drop(queue);

  let mut workers = JoinSet::new();
  for _ in 0..config.parallelism.max(1) {
    let rx = rx.clone();
    let resolver = resolver.clone();
    let inventory = inventory.clone();
    let host = config.host.clone();

    workers.spawn(async move {
      loop {
        let next = rx.lock().await.recv().await;
        let Some(candidate) = next else {
          break;
        };
        match resolve_for_host(resolver.as_ref(), &candidate.path, &host).await {
          Ok(source_id) => {
            debug!(path = ?candidate.path, source = %source_id, "resolved binary");
            inventory.push(ManagedBinary::new(candidate.path, source_id, candidate.writable));
          }
          Err(e) => debug!(path = ?candidate.path, error = %e, "skipping candidate"),
        }
      }
    });
  }

  while let Some(joined) = producers.join_next().await {
    if let Err(e) = joined {
      error!(error = %e, "directory listing task panicked");
    }
  }
  while let Some(joined) = workers.join_next().await {
    if let Err(e) = joined {
      error!(error = %e, "discovery worker panicked");
    }
  }

  inventory.retain_prefixes(&spec.package_filters);
  inventory.sort();

  info!(binaries = inventory.len(), "discovery complete");
  inventory
}

/// Queue every compiled executable directly inside `dir`.
fn list_directory(dir: &Path, check: &dyn ExecutableCheck, queue: &Queue) {
  let entries = match std::fs::read_dir(dir) {
    Ok(entries) => entries,
    Err(e) => {
      debug!(dir = ?dir, error = %e, "cannot list directory");
      return;
    }
  };
  let writable = can_write(dir);

  for entry in entries.flatten() {
    // Symlinks are not followed: only regular files count.
    let Ok(file_type) = entry.file_type() else {
      continue;
    };
    if !file_type.is_file() {
      continue;
    }
    let path = entry.path();
    let Ok(metadata) = entry.metadata() else {
      continue;
    };
    if !is_compiled_executable(check, &path, &metadata) {
      continue;
    }
    if !queue.push(Candidate { path, writable }) {
      return;
    }
  }
}
