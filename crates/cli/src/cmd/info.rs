use anyhow::Result;

use rebin_lib::Config;
use rebin_lib::paths::search_paths;

use crate::output::print_stat;

pub fn cmd_info() -> Result<()> {
  let config = Config::detect();

  println!("System:");
  print_stat("Platform", &config.host.to_string());
  match &config.home {
    Some(home) => print_stat("Home", &home.display().to_string()),
    None => print_stat("Home", "unknown"),
  }
  print_stat("Workers", &config.parallelism.to_string());
  print_stat("Go tool", &config.go_tool.to_string_lossy());

  println!();
  println!("Search paths:");
  let paths = search_paths(&config);
  if paths.is_empty() {
    println!("  (none)");
  }
  for path in paths {
    println!("  {}", path.display());
  }
  Ok(())
}
