use std::fmt;

/// Operating system a managed binary may target, in Go's `GOOS` spelling.
///
/// Systems without a dedicated variant are carried by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
  FreeBsd,
  Other(String),
}

impl Os {
  /// The operating system this process was built for.
  pub fn current() -> Self {
    Self::parse(std::env::consts::OS)
  }

  /// Parse an OS name as recorded in a binary's build metadata.
  pub fn parse(name: &str) -> Self {
    match name {
      "linux" => Self::Linux,
      "darwin" | "macos" => Self::MacOs,
      "windows" => Self::Windows,
      "freebsd" => Self::FreeBsd,
      other => Self::Other(other.to_string()),
    }
  }

  /// Returns the lowercase string identifier for this OS
  pub fn as_str(&self) -> &str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "darwin",
      Self::Windows => "windows",
      Self::FreeBsd => "freebsd",
      Self::Other(name) => name,
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
