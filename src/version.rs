//! Project version resolution.
//!
//! Every module of a build reports the same version string. The value comes
//! from exactly one source: a literal in the settings file or the contents of
//! a shared version file. It is resolved once per invocation and handed to
//! each consumer as a [`ProjectVersion`].

use crate::error::{ConfigError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fmt;

/// A validated project version.
///
/// Versions are non-empty and contain no whitespace, so they can be spliced
/// into file names and manifest values without quoting.
///
/// # Examples
///
/// ```
/// use jetbeep_build::version::ProjectVersion;
///
/// let version = ProjectVersion::parse("0.1.0-alpha").expect("valid version");
/// assert_eq!(version.as_str(), "0.1.0-alpha");
/// assert!(ProjectVersion::parse("0.1 beta").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectVersion(String);

impl ProjectVersion {
    /// Validate and wrap a version string.
    ///
    /// Leading and trailing whitespace is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidVersion`] when the trimmed value is
    /// empty or contains inner whitespace.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::InvalidVersion {
                value: raw.to_owned(),
                reason: "version is empty".to_owned(),
            });
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidVersion {
                value: raw.to_owned(),
                reason: "version contains whitespace".to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Return the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the project version is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// A version written directly in the settings file.
    Literal(String),
    /// A file whose trimmed contents are the version.
    File(Utf8PathBuf),
}

impl VersionSource {
    /// Build a source from the two optional settings fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConflictingVersionSources`] when both are set and
    /// [`ConfigError::MissingVersion`] when neither is.
    pub fn from_settings(literal: Option<&str>, file: Option<&Utf8Path>) -> Result<Self> {
        match (literal, file) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingVersionSources),
            (Some(value), None) => Ok(Self::Literal(value.to_owned())),
            (None, Some(path)) => Ok(Self::File(path.to_owned())),
            (None, None) => Err(ConfigError::MissingVersion),
        }
    }

    /// Resolve the source into a validated version.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::VersionFileUnreadable`] when the version file
    /// cannot be read, or [`ConfigError::InvalidVersion`] when the value is
    /// not a valid version.
    pub fn resolve(&self) -> Result<ProjectVersion> {
        match self {
            Self::Literal(value) => ProjectVersion::parse(value),
            Self::File(path) => {
                let contents = std::fs::read_to_string(path).map_err(|source| {
                    ConfigError::VersionFileUnreadable {
                        path: path.clone(),
                        source,
                    }
                })?;
                debug!("read version from {path}");
                ProjectVersion::parse(first_line(&contents))
            }
        }
    }
}

/// Version files may carry a trailing newline or a comment line after the
/// value; only the first non-blank line counts.
fn first_line(contents: &str) -> &str {
    contents
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}
