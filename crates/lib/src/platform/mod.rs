pub mod arch;
pub mod os;

use arch::Arch;
use os::Os;
use std::fmt;

/// Platform identifier combining OS and architecture (e.g., "linux/amd64")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
  pub os: Os,
  pub arch: Arch,
}

impl Platform {
  /// Create a new platform identifier
  pub fn new(os: Os, arch: Arch) -> Self {
    Self { os, arch }
  }

  /// The platform this process was built for
  pub fn current() -> Self {
    Self {
      os: Os::current(),
      arch: Arch::current(),
    }
  }

  /// Parse a platform from its OS and architecture names.
  pub fn parse(os: &str, arch: &str) -> Self {
    Self {
      os: Os::parse(os),
      arch: Arch::parse(arch),
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.os, self.arch)
  }
}
