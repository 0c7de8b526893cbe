//! Platform naming used by release asset names.

use std::fmt;

/// Operating system and architecture, spelled the way release assets are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    /// Build a platform from raw names, normalizing both.
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: normalize_os(os),
            arch: normalize_arch(arch),
        }
    }

    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Fragment an asset name must contain, e.g. `mysql-mcp_Linux_x86_64`.
    pub fn asset_fragment(&self, prefix: &str) -> String {
        format!("{}_{}_{}", prefix, self.os, self.arch)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.os, self.arch)
    }
}

/// Unknown names pass through unchanged.
pub fn normalize_os(os: &str) -> String {
    match os {
        "darwin" | "macos" => "Darwin",
        "linux" => "Linux",
        "windows" => "Windows",
        other => other,
    }
    .to_string()
}

/// Unknown names pass through unchanged.
pub fn normalize_arch(arch: &str) -> String {
    match arch {
        "amd64" => "x86_64",
        "aarch64" => "arm64",
        other => other,
    }
    .to_string()
}
