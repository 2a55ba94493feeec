//! Error types for loading the build settings.
//!
//! Each variant names the offending file or value so the orchestrator can
//! report it verbatim before aborting the build.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while loading settings or resolving the project version.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read settings file {path}")]
    SettingsUnreadable {
        /// Path of the settings file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML or does not match the schema.
    #[error("invalid settings file {path}: {reason}")]
    InvalidSettings {
        /// Path of the settings file.
        path: Utf8PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Both `version` and `version_file` were configured.
    #[error("project.version and project.version_file are mutually exclusive")]
    ConflictingVersionSources,

    /// Neither `version` nor `version_file` was configured.
    #[error("no project version configured; set project.version or project.version_file")]
    MissingVersion,

    /// The version file could not be read.
    #[error("failed to read version file {path}")]
    VersionFileUnreadable {
        /// Path of the version file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The version string is empty or malformed.
    #[error("invalid project version {value:?}: {reason}")]
    InvalidVersion {
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An environment override holds a value that cannot be used.
    #[error("invalid value {value:?} for {variable}: {reason}")]
    InvalidEnvOverride {
        /// Name of the environment variable.
        variable: &'static str,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A path in the settings is not valid UTF-8.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(std::path::PathBuf),
}

/// Result type alias using [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_version_suggests_both_keys() {
        let msg = ConfigError::MissingVersion.to_string();
        assert!(msg.contains("project.version"));
        assert!(msg.contains("project.version_file"));
    }

    #[test]
    fn env_override_error_names_variable() {
        let err = ConfigError::InvalidEnvOverride {
            variable: "JETBEEP_BUILD_JOBS",
            value: "many".to_owned(),
            reason: "not a positive integer".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("JETBEEP_BUILD_JOBS"));
        assert!(msg.contains("many"));
    }

    #[test]
    fn unreadable_settings_keeps_source() {
        let err = ConfigError::SettingsUnreadable {
            path: Utf8PathBuf::from("jetbeep-build.toml"),
            source: std::io::Error::other("denied"),
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
