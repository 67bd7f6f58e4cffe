//! rebin-lib: discovery and in-place rebuilding of compiled executables.
//!
//! This crate provides the two pipelines behind `rebin`:
//! - `discover`: turns search arguments into an inventory of managed
//!   binaries, each matched to the source it was built from
//! - `update`: groups binaries by source, rebuilds each source once in a
//!   throwaway workspace and copies the result over every occurrence
//!
//! Source resolution and the fetch/build toolchain are capabilities
//! (`resolve::SourceResolver`, `toolchain::Toolchain`) with Go-backed
//! implementations included.

pub mod classify;
pub mod config;
pub mod discover;
pub mod paths;
pub mod platform;
pub mod resolve;
pub mod toolchain;
pub mod update;
pub mod util;

pub use config::Config;
pub use discover::{DiscoverError, Inventory, ManagedBinary, SearchSpec, discover};
pub use update::{UpdateError, UpdateOptions, UpdateSummary, fetch_sources, update};
