//! Native library discovery.

use crate::discover::files_matching;
use crate::error::{DistError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::collections::BTreeMap;
use std::fmt;

/// Shared-library flavours the distribution can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlatformFamily {
    /// `*.dylib`
    MacOs,
    /// `*.so`
    Linux,
    /// `*.dll`
    Windows,
}

impl PlatformFamily {
    /// Every family, in discovery order.
    pub const ALL: [Self; 3] = [Self::MacOs, Self::Linux, Self::Windows];

    /// The glob matching this family's libraries.
    #[must_use]
    pub const fn pattern(self) -> &'static str {
        match self {
            Self::MacOs => "*.dylib",
            Self::Linux => "*.so",
            Self::Windows => "*.dll",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MacOs => "macOS",
            Self::Linux => "Linux",
            Self::Windows => "Windows",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The native libraries found in the native output directory, at most one
/// per platform family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeArtefactSet {
    libraries: BTreeMap<PlatformFamily, Utf8PathBuf>,
}

impl NativeArtefactSet {
    /// Scan `dir` (non-recursively) for shared libraries.
    ///
    /// # Errors
    ///
    /// Returns [`DistError::MissingInput`] if `dir` does not exist,
    /// [`DistError::DuplicateNativeLibrary`] if a family matches more than
    /// one file, and [`DistError::NoNativeLibraries`] if nothing matches.
    pub fn collect(dir: &Utf8Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(DistError::MissingInput {
                what: "native library directory",
                path: dir.to_owned(),
            });
        }

        let mut libraries = BTreeMap::new();
        for family in PlatformFamily::ALL {
            let mut matches = files_matching(dir, family.pattern())?.into_iter();
            let Some(first) = matches.next() else {
                continue;
            };
            if let Some(second) = matches.next() {
                return Err(DistError::DuplicateNativeLibrary {
                    family: family.label(),
                    first,
                    second,
                });
            }
            debug!("found {family} native library {first}");
            libraries.insert(family, first);
        }

        if libraries.is_empty() {
            return Err(DistError::NoNativeLibraries {
                dir: dir.to_owned(),
                patterns: PlatformFamily::ALL.map(PlatformFamily::pattern).join(", "),
            });
        }
        Ok(Self { libraries })
    }

    /// The library for `family`, if one was found.
    #[must_use]
    pub fn get(&self, family: PlatformFamily) -> Option<&Utf8Path> {
        self.libraries.get(&family).map(Utf8PathBuf::as_path)
    }

    /// Libraries in family order.
    pub fn iter(&self) -> impl Iterator<Item = (PlatformFamily, &Utf8Path)> {
        self.libraries
            .iter()
            .map(|(family, path)| (*family, path.as_path()))
    }

    /// Number of libraries found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    /// Always false for a collected set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    struct NativeDir {
        _dir: TempDir,
        path: Utf8PathBuf,
    }

    impl NativeDir {
        fn touch(&self, name: &str) {
            fs::write(self.path.join(name), b"\x7fELF").expect("write library");
        }
    }

    #[fixture]
    fn native_dir() -> NativeDir {
        let dir = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8");
        NativeDir { _dir: dir, path }
    }

    #[rstest]
    fn one_library_per_family(native_dir: NativeDir) {
        native_dir.touch("libjetbeep-jni.so");
        native_dir.touch("libjetbeep-jni.dylib");
        native_dir.touch("jetbeep-jni.dll");
        native_dir.touch("CMakeCache.txt");

        let set = NativeArtefactSet::collect(&native_dir.path).expect("collects");
        assert_eq!(set.len(), 3);
        assert_eq!(
            set.get(PlatformFamily::Linux).and_then(Utf8Path::file_name),
            Some("libjetbeep-jni.so")
        );
        let families: Vec<_> = set.iter().map(|(family, _)| family).collect();
        assert_eq!(families, PlatformFamily::ALL);
    }

    #[rstest]
    fn nested_libraries_are_ignored(native_dir: NativeDir) {
        native_dir.touch("libjetbeep-jni.so");
        fs::create_dir(native_dir.path.join("old")).expect("subdir");
        fs::write(native_dir.path.join("old/libjetbeep-jni.so"), b"").expect("write");

        let set = NativeArtefactSet::collect(&native_dir.path).expect("collects");
        assert_eq!(set.len(), 1);
    }

    #[rstest]
    fn duplicate_family_is_rejected(native_dir: NativeDir) {
        native_dir.touch("libjetbeep-jni.so");
        native_dir.touch("libjetbeep-jni-debug.so");

        let err = NativeArtefactSet::collect(&native_dir.path).expect_err("duplicate");
        assert!(matches!(
            err,
            DistError::DuplicateNativeLibrary { family: "Linux", .. }
        ));
    }

    #[rstest]
    fn empty_directory_is_rejected(native_dir: NativeDir) {
        native_dir.touch("README.txt");
        let err = NativeArtefactSet::collect(&native_dir.path).expect_err("empty");
        assert!(err.to_string().contains("*.dylib, *.so, *.dll"));
    }

    #[test]
    fn missing_directory_is_rejected() {
        let err = NativeArtefactSet::collect(Utf8Path::new("/nonexistent/libjetbeep-jni"))
            .expect_err("missing");
        assert!(matches!(err, DistError::MissingInput { .. }));
    }
}
