use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

use output::OutputFormat;

/// rebin - finds Go executables, lists them, mirrors their sources and rebuilds them in place
#[derive(Parser)]
#[command(name = "rebin")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// List managed binaries (default search: $PATH, $GOBIN and $GOPATH/bin under $HOME)
  List {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Directories, executables or package prefixes to search
    args: Vec<String>,
  },

  /// Rebuild managed binaries in place from their sources
  Update {
    /// Pass "-ldflags=<FLAGS>" to the install action
    #[arg(long, allow_hyphen_values = true)]
    ldflags: Option<String>,

    /// Minimum number of parallel workers
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Give up on a single fetch or build after this long (e.g. "90s", "5m")
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Also report binaries that cannot be replaced
    #[arg(long)]
    report_skipped: bool,

    /// Directories, executables or package prefixes to search
    args: Vec<String>,
  },

  /// Fetch the sources of managed binaries into a workspace root ("." for the current $GOPATH)
  Source {
    /// Target workspace root
    dir: PathBuf,

    /// Directories, executables or package prefixes to search
    args: Vec<String>,
  },

  /// Show host and search configuration
  Info,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::List { format, args } => cmd::cmd_list(&args, format),
    Commands::Update {
      ldflags,
      jobs,
      timeout,
      report_skipped,
      args,
    } => cmd::cmd_update(
      &args,
      cmd::UpdateFlags {
        ldflags,
        jobs,
        timeout,
        report_skipped,
      },
    ),
    Commands::Source { dir, args } => cmd::cmd_source(&dir, &args),
    Commands::Info => cmd::cmd_info(),
  }
}
