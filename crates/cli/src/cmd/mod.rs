mod info;
mod list;
mod source;
mod update;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;

use rebin_lib::resolve::GoBuildInfoResolver;
use rebin_lib::{Config, Inventory, discover};

pub use info::cmd_info;
pub use list::cmd_list;
pub use source::cmd_source;
pub use update::{UpdateFlags, cmd_update};

fn runtime() -> Result<Runtime> {
  Runtime::new().context("Failed to create async runtime")
}

/// Run discovery for `args` with the Go build-info resolver.
fn discover_binaries(rt: &Runtime, args: &[String], config: &Config) -> Result<Inventory> {
  let resolver = Arc::new(GoBuildInfoResolver::new(config.go_tool.clone()));
  rt.block_on(discover(args, config, resolver))
    .context("Discovery failed")
}
