//! In-place writability probe.

use std::ffi::OsString;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

/// Whether `path` can currently be replaced in place.
///
/// For a directory, a temporary entry is created inside it and removed. For a
/// file, a temporary sibling is created, the file is renamed onto it and then
/// renamed back. Returns true iff every step succeeds.
///
/// The probe leaves the filesystem as it found it. If the file cannot be moved
/// back, it is left under the temporary name rather than deleted.
pub fn can_write(path: &Path) -> bool {
  let Ok(metadata) = fs::metadata(path) else {
    return false;
  };

  if metadata.is_dir() {
    return tempfile::Builder::new()
      .prefix(".rebin-probe")
      .tempfile_in(path)
      .is_ok();
  }

  let Some(dir) = path.parent() else {
    return false;
  };
  let mut prefix = OsString::from(".");
  prefix.push(path.file_name().unwrap_or_default());

  let temp = match tempfile::Builder::new().prefix(&prefix).tempfile_in(dir) {
    Ok(temp) => temp.into_temp_path(),
    Err(_) => return false,
  };

  if let Err(e) = fs::rename(path, &temp) {
    debug!(path = ?path, error = %e, "file cannot be moved aside");
    return false;
  }

  match fs::rename(&temp, path) {
    Ok(()) => true,
    Err(e) => {
      warn!(path = ?path, temp = ?temp, error = %e, "failed to restore probed file");
      // Dropping the TempPath would delete the moved file.
      if let Err(e) = temp.keep() {
        warn!(error = %e, "failed to keep probed file");
      }
      false
    }
  }
}
