use std::fmt;

/// CPU architecture a managed binary may target, in Go's `GOARCH` spelling.
///
/// Architectures without a dedicated variant are carried by name, so any
/// two platforms can be compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
  X86_64,
  X86,
  Aarch64,
  Arm,
  Other(String),
}

impl Arch {
  /// The architecture this process was built for.
  pub fn current() -> Self {
    match std::env::consts::ARCH {
      "powerpc64" if cfg!(target_endian = "little") => Self::Other("ppc64le".to_string()),
      "powerpc64" => Self::Other("ppc64".to_string()),
      "loongarch64" => Self::Other("loong64".to_string()),
      name => Self::parse(name),
    }
  }

  /// Parse an architecture name as recorded in a binary's build metadata.
  ///
  /// Accepts both toolchain spellings (`amd64`, `arm64`, `386`) and Rust's own.
  /// Any other name is kept verbatim.
  pub fn parse(name: &str) -> Self {
    match name {
      "amd64" | "x86_64" => Self::X86_64,
      "386" | "x86" | "i686" => Self::X86,
      "arm64" | "aarch64" => Self::Aarch64,
      "arm" => Self::Arm,
      other => Self::Other(other.to_string()),
    }
  }

  /// Returns the toolchain identifier for this architecture
  pub fn as_str(&self) -> &str {
    match self {
      Self::X86_64 => "amd64",
      Self::X86 => "386",
      Self::Aarch64 => "arm64",
      Self::Arm => "arm",
      Self::Other(name) => name,
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_accepts_both_spellings() {
    assert_eq!(Arch::parse("amd64"), Arch::X86_64);
    assert_eq!(Arch::parse("x86_64"), Arch::X86_64);
    assert_eq!(Arch::parse("arm64"), Arch::Aarch64);
  }

  #[test]
  fn unlisted_architectures_pass_through() {
    assert_eq!(Arch::parse("riscv64"), Arch::Other("riscv64".to_string()));
    assert_eq!(Arch::parse("riscv64").to_string(), "riscv64");
    assert_eq!(Arch::parse("s390x"), Arch::parse("s390x"));
    assert_ne!(Arch::parse("riscv64"), Arch::parse("s390x"));
  }

  #[test]
  fn display_uses_toolchain_names() {
    assert_eq!(Arch::Aarch64.to_string(), "arm64");
    assert_eq!(Arch::X86.to_string(), "386");
  }
}
