//! Implementation of the `rebin list` command.

use anyhow::Result;

use rebin_lib::Config;

use crate::output::{OutputFormat, binary_line, print_json};

/// Print every managed binary as `<path>\t(<source>)`, or the inventory as JSON.
pub fn cmd_list(args: &[String], format: OutputFormat) -> Result<()> {
  let config = Config::detect();
  let rt = super::runtime()?;
  let inventory = super::discover_binaries(&rt, args, &config)?;

  if format.is_json() {
    return print_json(&inventory.snapshot());
  }
  for binary in inventory.snapshot() {
    println!("{}", binary_line(&binary));
  }
  Ok(())
}
