//! Host platform detection and archive qualifier normalisation.
//!
//! Distribution archives are qualified by the host operating system name and
//! CPU architecture using the same vocabulary as the JVM's `os.name` and
//! `os.arch` system properties.

use std::fmt;

/// The operating system and architecture an archive is built for.
///
/// Values are stored raw (for example `Mac OS X`) and normalised on demand.
///
/// # Examples
///
/// ```
/// use jetbeep_build::platform::HostPlatform;
///
/// let platform = HostPlatform::new("Mac OS X", "aarch64");
/// assert_eq!(platform.os_qualifier(), "mac_os_x");
/// assert_eq!(platform.arch_qualifier(), "aarch64");
/// assert!(!platform.is_windows());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlatform {
    os_name: String,
    os_arch: String,
}

impl HostPlatform {
    /// Create a platform from explicit OS and architecture names.
    #[must_use]
    pub fn new(os_name: impl Into<String>, os_arch: impl Into<String>) -> Self {
        Self {
            os_name: os_name.into(),
            os_arch: os_arch.into(),
        }
    }

    /// Detect the platform this process is running on.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_rust_consts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Translate Rust's `target_os`/`target_arch` names into JVM names.
    ///
    /// The JVM reports `amd64` for 64-bit x86 on Linux and Windows but
    /// `x86_64` on macOS; this mapping follows that quirk.
    ///
    /// Windows is reported without its release number, whereas the JVM says
    /// `Windows 10` or `Windows 11`. Pass the full name through
    /// [`HostPlatform::with_overrides`] to reproduce a JVM-qualified archive
    /// name such as `windows_10`.
    #[must_use]
    pub fn from_rust_consts(os: &str, arch: &str) -> Self {
        let os_name = match os {
            "linux" => "Linux",
            "macos" => "Mac OS X",
            "windows" => "Windows",
            "freebsd" => "FreeBSD",
            "openbsd" => "OpenBSD",
            "netbsd" => "NetBSD",
            "solaris" => "SunOS",
            other => other,
        };
        let os_arch = match (os, arch) {
            ("macos", "x86_64") => "x86_64",
            (_, "x86_64") => "amd64",
            (_, "x86") => "x86",
            (_, "powerpc64") => "ppc64",
            (_, other) => other,
        };
        Self::new(os_name, os_arch)
    }

    /// Replace the OS name and/or architecture, keeping unset parts.
    #[must_use]
    pub fn with_overrides(self, os_name: Option<&str>, os_arch: Option<&str>) -> Self {
        Self {
            os_name: os_name.map_or(self.os_name, str::to_owned),
            os_arch: os_arch.map_or(self.os_arch, str::to_owned),
        }
    }

    /// Return the raw OS name.
    #[must_use]
    pub fn os_name(&self) -> &str {
        &self.os_name
    }

    /// Return the raw architecture name.
    #[must_use]
    pub fn os_arch(&self) -> &str {
        &self.os_arch
    }

    /// Return the normalised OS name used in archive names.
    #[must_use]
    pub fn os_qualifier(&self) -> String {
        normalise_qualifier(&self.os_name)
    }

    /// Return the normalised architecture used in archive names.
    #[must_use]
    pub fn arch_qualifier(&self) -> String {
        normalise_qualifier(&self.os_arch)
    }

    /// Whether the OS belongs to the Windows family.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os_name.to_lowercase().starts_with("windows")
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.os_name, self.os_arch)
    }
}

/// Lowercase a token and replace spaces with underscores.
///
/// # Examples
///
/// ```
/// use jetbeep_build::platform::normalise_qualifier;
///
/// assert_eq!(normalise_qualifier("Windows 10"), "windows_10");
/// ```
#[must_use]
pub fn normalise_qualifier(raw: &str) -> String {
    raw.to_lowercase().replace(' ', "_")
}
