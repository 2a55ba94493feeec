//! Distribution archive naming.
//!
//! Archives are named `<project>-<version>-<os_name>-<os_arch>.<ext>`, with
//! every token lowercased and spaces replaced by underscores, so the name
//! alone identifies the version and platform an archive was built for.

use jetbeep_build::platform::normalise_qualifier;
use jetbeep_build::{ArchiveFormat, HostPlatform, ProjectVersion};
use std::fmt;

/// A fully-qualified distribution archive name.
///
/// # Examples
///
/// ```
/// use jetbeep_build::{ArchiveFormat, HostPlatform, ProjectVersion};
/// use jetbeep_dist::artefact::naming::DistributionName;
///
/// let version = ProjectVersion::parse("0.1.0-alpha").expect("valid version");
/// let host = HostPlatform::new("Mac OS X", "x86_64");
/// let name = DistributionName::new("libjetbeep-jni", &version, &host, ArchiveFormat::Zip);
/// assert_eq!(
///     name.to_string(),
///     "libjetbeep-jni-0.1.0-alpha-mac_os_x-x86_64.zip"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionName {
    project: String,
    version: String,
    os_name: String,
    os_arch: String,
    format: ArchiveFormat,
}

impl DistributionName {
    /// Build a name from the project, its version and the target platform.
    #[must_use]
    pub fn new(
        project: &str,
        version: &ProjectVersion,
        host: &HostPlatform,
        format: ArchiveFormat,
    ) -> Self {
        Self {
            project: normalise_qualifier(project),
            version: normalise_qualifier(version.as_str()),
            os_name: host.os_qualifier(),
            os_arch: host.arch_qualifier(),
            format,
        }
    }

    /// File name without the extension.
    #[must_use]
    pub fn stem(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.project, self.version, self.os_name, self.os_arch
        )
    }

    /// The archive format implied by the extension.
    #[must_use]
    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    /// Return the filename as a string.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DistributionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.stem(), self.format.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn version() -> ProjectVersion {
        ProjectVersion::parse("0.1.0-alpha").expect("valid version")
    }

    #[rstest]
    #[case::linux("Linux", "amd64", "libjetbeep-jni-0.1.0-alpha-linux-amd64.zip")]
    #[case::windows("Windows 10", "amd64", "libjetbeep-jni-0.1.0-alpha-windows_10-amd64.zip")]
    #[case::mac("Mac OS X", "aarch64", "libjetbeep-jni-0.1.0-alpha-mac_os_x-aarch64.zip")]
    fn names_follow_the_jvm_platform_vocabulary(
        version: ProjectVersion,
        #[case] os: &str,
        #[case] arch: &str,
        #[case] expected: &str,
    ) {
        let host = HostPlatform::new(os, arch);
        let name = DistributionName::new("libjetbeep-jni", &version, &host, ArchiveFormat::Zip);
        assert_eq!(name.filename(), expected);
    }

    #[rstest]
    fn tarball_extension(version: ProjectVersion) {
        let host = HostPlatform::new("Linux", "amd64");
        let name = DistributionName::new("libjetbeep-jni", &version, &host, ArchiveFormat::TarGz);
        assert_eq!(name.filename(), "libjetbeep-jni-0.1.0-alpha-linux-amd64.tar.gz");
        assert_eq!(name.format(), ArchiveFormat::TarGz);
    }

    #[rstest]
    fn every_token_is_normalised() {
        let version = ProjectVersion::parse("1.0-RC1").expect("valid version");
        let host = HostPlatform::new("SunOS", "Sparc V9");
        let name = DistributionName::new("JetBeep JNI", &version, &host, ArchiveFormat::Zip);
        assert_eq!(name.filename(), "jetbeep_jni-1.0-rc1-sunos-sparc_v9.zip");
    }

    #[rstest]
    fn different_platforms_produce_different_names(version: ProjectVersion) {
        let linux = DistributionName::new(
            "libjetbeep-jni",
            &version,
            &HostPlatform::new("Linux", "amd64"),
            ArchiveFormat::Zip,
        );
        let mac = DistributionName::new(
            "libjetbeep-jni",
            &version,
            &HostPlatform::new("Mac OS X", "x86_64"),
            ArchiveFormat::Zip,
        );
        assert_ne!(linux, mac);
    }
}
