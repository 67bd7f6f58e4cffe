//! Toolchain that shells out to a build tool.

use std::ffi::OsString;
use std::process::Output;

use tokio::process::Command;
use tracing::{debug, info};

use super::{ActionError, ActionFailure, ActionKind, EnvOverlay, Toolchain};

/// Placeholder replaced by the source identifier.
pub const SOURCE_PLACEHOLDER: &str = "{source}";

/// Placeholder replaced by the caller's extra install arguments (zero or more).
pub const ARGS_PLACEHOLDER: &str = "{args}";

/// Runs `program` with templated arguments for each action.
///
/// The overlay is applied by setting `build_root_var` and `install_dir_var`
/// on top of the inherited environment.
#[derive(Debug, Clone)]
pub struct CommandToolchain {
  pub program: OsString,
  pub fetch_args: Vec<String>,
  pub install_args: Vec<String>,
  pub build_root_var: String,
  pub install_dir_var: String,
}

impl CommandToolchain {
  /// `go get <source>` then `go install <args> <source>`, redirected via `GOPATH` and `GOBIN`.
  pub fn go(program: impl Into<OsString>) -> Self {
    Self {
      program: program.into(),
      fetch_args: vec!["get".to_string(), SOURCE_PLACEHOLDER.to_string()],
      install_args: vec![
        "install".to_string(),
        ARGS_PLACEHOLDER.to_string(),
        SOURCE_PLACEHOLDER.to_string(),
      ],
      build_root_var: "GOPATH".to_string(),
      install_dir_var: "GOBIN".to_string(),
    }
  }

  fn expand(template: &[String], source_id: &str, extra_args: &[String]) -> Vec<String> {
    let mut args = Vec::with_capacity(template.len() + extra_args.len());
    for arg in template {
      match arg.as_str() {
        ARGS_PLACEHOLDER => args.extend(extra_args.iter().cloned()),
        _ => args.push(arg.replace(SOURCE_PLACEHOLDER, source_id)),
      }
    }
    args
  }

  async fn run(
    &self,
    action: ActionKind,
    template: &[String],
    source_id: &str,
    extra_args: &[String],
    overlay: &EnvOverlay,
  ) -> Result<String, ActionError> {
    let args = Self::expand(template, source_id, extra_args);
    info!(action = %action, source = %source_id, "running toolchain");
    debug!(program = ?self.program, args = ?args, build_root = ?overlay.build_root, "spawning process");

    let output = Command::new(&self.program)
      .args(&args)
      .current_dir(&overlay.build_root)
      .env(&self.build_root_var, &overlay.build_root)
      .env(&self.install_dir_var, &overlay.install_dir)
      .kill_on_drop(true)
      .output()
      .await
      .map_err(|e| ActionError::new(action, source_id, ActionFailure::Spawn(e), String::new()))?;

    let combined = combined_output(&output);
    if !output.status.success() {
      return Err(ActionError::new(
        action,
        source_id,
        ActionFailure::Exit(output.status),
        combined,
      ));
    }
    Ok(combined)
  }
}

impl Toolchain for CommandToolchain {
  async fn fetch(&self, source_id: &str, overlay: &EnvOverlay) -> Result<String, ActionError> {
    self
      .run(ActionKind::Fetch, &self.fetch_args, source_id, &[], overlay)
      .await
  }

  async fn build_and_install(
    &self,
    source_id: &str,
    extra_args: &[String],
    overlay: &EnvOverlay,
  ) -> Result<String, ActionError> {
    self
      .run(ActionKind::Install, &self.install_args, source_id, extra_args, overlay)
      .await
  }
}

/// stdout followed by stderr.
fn combined_output(output: &Output) -> String {
  let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
  combined.push_str(&String::from_utf8_lossy(&output.stderr));
  combined
}
