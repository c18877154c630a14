//! Architecture detection for release asset selection

use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;

/// Target architectures node_exporter publishes Linux tarballs for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    LinuxAmd64,
    LinuxArm64,
    LinuxArmv7,
}

/// Global cache for platform detection (initialized once, used everywhere)
static PLATFORM_CACHE: OnceCell<Platform> = OnceCell::new();

impl Platform {
    /// Detect current platform (cached after first call)
    pub fn detect() -> Result<Self> {
        PLATFORM_CACHE
            .get_or_try_init(Self::detect_uncached)
            .copied()
    }

    /// Internal uncached detection - called only once
    fn detect_uncached() -> Result<Self> {
        match (std::env::consts::OS, std::env::consts::ARCH) {
            ("linux", "x86_64") => Ok(Platform::LinuxAmd64),
            ("linux", "aarch64") => Ok(Platform::LinuxArm64),
            ("linux", "arm") => Ok(Platform::LinuxArmv7),
            ("linux", arch) => Err(anyhow!("Unsupported Linux architecture: {}", arch)),
            (os, arch) => Err(anyhow!("Unsupported platform: {} {}", os, arch)),
        }
    }

    /// Asset suffix used in release tarball names, e.g. `linux-amd64`
    pub fn release_suffix(&self) -> &'static str {
        match self {
            Platform::LinuxAmd64 => "linux-amd64",
            Platform::LinuxArm64 => "linux-arm64",
            Platform::LinuxArmv7 => "linux-armv7",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_matches_release_naming() {
        assert_eq!(Platform::LinuxAmd64.release_suffix(), "linux-amd64");
        assert_eq!(Platform::LinuxArm64.release_suffix(), "linux-arm64");
        assert_eq!(Platform::LinuxArmv7.release_suffix(), "linux-armv7");
    }
}
