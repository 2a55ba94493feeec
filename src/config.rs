//! Build settings loaded from `jetbeep-build.toml`.
//!
//! The settings file describes where the native build tree, the Java binding
//! module and the example application live, and how the distribution archive
//! is produced. Every table falls back to defaults that match the jetbeep
//! repository layout, so an empty file plus a version is a working
//! configuration. Unknown keys are rejected to catch typos early.
//!
//! Relative paths are resolved against the directory holding the settings
//! file; see [`Project`].

use crate::error::{ConfigError, Result};
use crate::version::{ProjectVersion, VersionSource};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;
use std::fmt;
use std::num::NonZeroUsize;

/// Default name of the settings file looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "jetbeep-build.toml";

/// Environment variable overriding `native.jobs`.
pub const JOBS_ENV: &str = "JETBEEP_BUILD_JOBS";

/// Environment variable overriding the README converter binary.
pub const MDPDF_ENV: &str = "JETBEEP_MDPDF";

/// Top-level settings document.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSettings {
    /// Project identity and version source.
    pub project: ProjectSettings,
    /// Native library build.
    pub native: NativeSettings,
    /// Java binding module.
    pub java: JavaSettings,
    /// Example application packaged into the distribution.
    pub example: ExampleSettings,
    /// Distribution archive output.
    pub dist: DistSettings,
    /// External tool behaviour.
    pub tools: ToolSettings,
}

/// Project identity.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectSettings {
    /// Name used as the archive prefix.
    pub name: String,
    /// Literal version string.
    pub version: Option<String>,
    /// File holding the version string.
    pub version_file: Option<Utf8PathBuf>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            name: "libjetbeep-jni".to_owned(),
            version: None,
            version_file: None,
        }
    }
}

/// Native library build settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct NativeSettings {
    /// Build tool executable.
    pub program: String,
    /// Configured build tree the tool runs in.
    pub build_dir: Utf8PathBuf,
    /// Build target name.
    pub target: String,
    /// Parallel compile jobs passed after `--`.
    pub jobs: Option<NonZeroUsize>,
    /// Directory the built shared libraries are collected from.
    pub output_dir: Utf8PathBuf,
}

impl Default for NativeSettings {
    fn default() -> Self {
        Self {
            program: "cmake".to_owned(),
            build_dir: Utf8PathBuf::from("../build"),
            target: "jetbeep-jni".to_owned(),
            jobs: None,
            output_dir: Utf8PathBuf::from("libjetbeep-jni"),
        }
    }
}

/// Java binding module settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct JavaSettings {
    /// Module name, stamped as `Implementation-Title`.
    pub module: String,
    /// Root of the module's Java sources.
    pub source_dir: Utf8PathBuf,
    /// Module build directory (`classes/`, `libs/`, `docs/`).
    pub build_dir: Utf8PathBuf,
    /// Produce a Javadoc JAR.
    pub javadoc: bool,
    /// Produce a sources JAR.
    pub sources: bool,
    /// JDK installation; falls back to `JAVA_HOME` then `PATH`.
    pub jdk_home: Option<Utf8PathBuf>,
}

impl Default for JavaSettings {
    fn default() -> Self {
        Self {
            module: "libjetbeep-jni-java".to_owned(),
            source_dir: Utf8PathBuf::from("libjetbeep-jni-java/src/main/java"),
            build_dir: Utf8PathBuf::from("libjetbeep-jni-java/build"),
            javadoc: true,
            sources: true,
            jdk_home: None,
        }
    }
}

/// Example application settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ExampleSettings {
    /// Application name, used for the JAR and launcher scripts.
    pub name: String,
    /// Source tree copied into the archive's `src/` directory.
    pub source_dir: Utf8PathBuf,
    /// Example build directory.
    pub build_dir: Utf8PathBuf,
    /// Fully-qualified main class.
    pub main_class: String,
    /// README shipped at the archive root.
    pub readme: Utf8PathBuf,
    /// Convert the README to PDF before assembly.
    pub pdf: bool,
    /// JVM arguments baked into the launchers; `{app_home}` expands to the
    /// installation directory.
    pub jvm_args: Vec<String>,
}

impl Default for ExampleSettings {
    fn default() -> Self {
        Self {
            name: "example".to_owned(),
            source_dir: Utf8PathBuf::from("example/src"),
            build_dir: Utf8PathBuf::from("example/build"),
            main_class: "example.Main".to_owned(),
            readme: Utf8PathBuf::from("example/README.md"),
            pdf: true,
            jvm_args: vec!["-Djava.library.path={app_home}/libjetbeep-jni".to_owned()],
        }
    }
}

/// Distribution archive format.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveFormat {
    /// A `.zip` archive.
    #[default]
    Zip,
    /// A gzip-compressed tarball.
    TarGz,
}

impl ArchiveFormat {
    /// File extension without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Zip => "zip",
            Self::TarGz => "tar-gz",
        })
    }
}

/// Distribution output settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DistSettings {
    /// Directory the archive is written to.
    pub output_dir: Utf8PathBuf,
    /// Archive format.
    pub format: ArchiveFormat,
    /// Name of the archive folder holding the native libraries.
    pub native_dir_name: String,
}

impl Default for DistSettings {
    fn default() -> Self {
        Self {
            output_dir: Utf8PathBuf::from("build/distributions"),
            format: ArchiveFormat::Zip,
            native_dir_name: "libjetbeep-jni".to_owned(),
        }
    }
}

/// External tool settings.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSettings {
    /// Kill a tool that runs longer than this many seconds.
    pub timeout_secs: Option<u64>,
    /// Override for the README converter binary name.
    pub mdpdf: Option<String>,
}

impl BuildSettings {
    /// Parse settings from TOML text.
    ///
    /// `origin` is only used to label errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSettings`] when the text is not valid
    /// TOML or contains unknown keys.
    pub fn from_toml_str(text: &str, origin: &Utf8Path) -> Result<Self> {
        toml::from_str(text).map_err(|err| ConfigError::InvalidSettings {
            path: origin.to_owned(),
            reason: err.to_string().trim().to_owned(),
        })
    }

    /// Read and parse a settings file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SettingsUnreadable`] or
    /// [`ConfigError::InvalidSettings`].
    pub fn read(path: &Utf8Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|source| ConfigError::SettingsUnreadable {
                path: path.to_owned(),
                source,
            })?;
        Self::from_toml_str(&text, path)
    }

    /// Apply environment overrides from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Self::apply_env_overrides_with`].
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_env_overrides_with(|name| std::env::var(name).ok())
    }

    /// Apply environment overrides using the supplied lookup.
    ///
    /// Blank values are ignored so an exported-but-empty variable does not
    /// clobber the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvOverride`] when `JETBEEP_BUILD_JOBS`
    /// is not a positive integer.
    pub fn apply_env_overrides_with(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<()> {
        if let Some(raw) = non_blank(lookup(JOBS_ENV)) {
            let jobs = raw
                .parse::<NonZeroUsize>()
                .map_err(|_| ConfigError::InvalidEnvOverride {
                    variable: JOBS_ENV,
                    value: raw.clone(),
                    reason: "expected a positive integer".to_owned(),
                })?;
            debug!("{JOBS_ENV} overrides native.jobs with {jobs}");
            self.native.jobs = Some(jobs);
        }

        if let Some(raw) = non_blank(lookup(MDPDF_ENV)) {
            debug!("{MDPDF_ENV} overrides the README converter with {raw}");
            self.tools.mdpdf = Some(raw);
        }

        Ok(())
    }

    /// Build the version source described by the `[project]` table.
    ///
    /// # Errors
    ///
    /// See [`VersionSource::from_settings`].
    pub fn version_source(&self, root: &Utf8Path) -> Result<VersionSource> {
        let file = self
            .project
            .version_file
            .as_deref()
            .map(|path| resolve_path(root, path));
        VersionSource::from_settings(self.project.version.as_deref(), file.as_deref())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
}

/// Join `path` onto `root` unless it is already absolute.
#[must_use]
pub fn resolve_path(root: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_owned()
    } else {
        root.join(path)
    }
}

/// Settings bound to a project root with the version resolved.
///
/// Constructing a `Project` is the single point where the version is read,
/// so every consumer that receives one sees the same value.
#[derive(Clone, Debug)]
pub struct Project {
    root: Utf8PathBuf,
    settings: BuildSettings,
    version: ProjectVersion,
}

impl Project {
    /// Load the settings file, apply environment overrides and resolve the
    /// version.
    ///
    /// # Errors
    ///
    /// Returns any [`ConfigError`] raised while reading, overriding or
    /// resolving.
    pub fn load(settings_path: &Utf8Path) -> Result<Self> {
        let mut settings = BuildSettings::read(settings_path)?;
        settings.apply_env_overrides()?;
        let root = settings_root(settings_path)?;
        Self::from_settings(root, settings)
    }

    /// Bind already-parsed settings to `root`.
    ///
    /// # Errors
    ///
    /// Returns a version source or resolution error.
    pub fn from_settings(root: Utf8PathBuf, settings: BuildSettings) -> Result<Self> {
        let version = settings.version_source(&root)?.resolve()?;
        debug!("project {} version {version}", settings.project.name);
        Ok(Self {
            root,
            settings,
            version,
        })
    }

    /// Project root directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// The parsed settings.
    #[must_use]
    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Mutable access for command-line overrides.
    pub fn settings_mut(&mut self) -> &mut BuildSettings {
        &mut self.settings
    }

    /// The resolved project version.
    #[must_use]
    pub fn version(&self) -> &ProjectVersion {
        &self.version
    }

    /// The project name used as the archive prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.settings.project.name
    }

    /// Resolve a settings path against the project root.
    #[must_use]
    pub fn path(&self, relative: &Utf8Path) -> Utf8PathBuf {
        resolve_path(&self.root, relative)
    }
}

/// The directory holding the settings file, made absolute.
fn settings_root(settings_path: &Utf8Path) -> Result<Utf8PathBuf> {
    let parent = settings_path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let absolute = std::path::absolute(parent.as_std_path()).map_err(|source| {
        ConfigError::SettingsUnreadable {
            path: settings_path.to_owned(),
            source,
        }
    })?;
    Utf8PathBuf::from_path_buf(absolute).map_err(ConfigError::NonUtf8Path)
}
