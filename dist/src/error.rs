//! Error types for the jetbeep distribution builder.
//!
//! Every failure is fatal to the build. Variants carry enough context (the
//! failing command, the offending path) for the binary to print a single
//! actionable line before exiting.

use crate::graph::GraphError;
use crate::java::manifest::ManifestError;
use camino::Utf8PathBuf;
use jetbeep_build::ConfigError;
use thiserror::Error;

/// Errors that can occur while building or packaging.
#[derive(Debug, Error)]
pub enum DistError {
    /// The settings file or project version could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An external tool exited unsuccessfully.
    #[error("{step} failed: `{command}` exited with {status}{}", stderr_suffix(.stderr))]
    StepFailed {
        /// The build step that ran the tool.
        step: &'static str,
        /// The command line that failed.
        command: String,
        /// Description of the exit status.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// An external tool could not be started.
    #[error("failed to start `{command}`")]
    Spawn {
        /// The command line that could not be started.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An external tool ran past its time limit and was killed.
    #[error("`{command}` timed out after {seconds} seconds")]
    Timeout {
        /// The command line that was killed.
        command: String,
        /// The configured limit.
        seconds: u64,
    },

    /// A source tree contained no files to compile.
    #[error("no Java sources found under {dir}")]
    NoSources {
        /// Directory that was searched.
        dir: Utf8PathBuf,
    },

    /// The native output directory contained no shared libraries.
    #[error("no native libraries matching {patterns} found in {dir}")]
    NoNativeLibraries {
        /// Directory that was searched.
        dir: Utf8PathBuf,
        /// The glob patterns, comma separated.
        patterns: String,
    },

    /// More than one shared library was found for the same platform.
    #[error("found more than one {family} native library: {first} and {second}")]
    DuplicateNativeLibrary {
        /// Platform family label.
        family: &'static str,
        /// First match.
        first: Utf8PathBuf,
        /// Conflicting match.
        second: Utf8PathBuf,
    },

    /// A file or directory the build depends on does not exist.
    #[error("{what} not found at {path}")]
    MissingInput {
        /// Human-readable name of the input.
        what: &'static str,
        /// Where it was expected.
        path: Utf8PathBuf,
    },

    /// The README converter exited successfully without writing its output.
    #[error("README conversion reported success but {path} was not written")]
    ConversionOutputMissing {
        /// The expected PDF path.
        path: Utf8PathBuf,
    },

    /// A JAR manifest attribute was rejected.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Writing a zip-based archive failed.
    #[error("failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A glob pattern was invalid or a match could not be read.
    #[error("failed to scan {pattern}: {reason}")]
    Glob {
        /// The pattern being expanded.
        pattern: String,
        /// Description of the failure.
        reason: String,
    },

    /// The task graph is malformed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A path produced during the build is not valid UTF-8.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(std::path::PathBuf),

    /// Serialising the build report failed.
    #[error("failed to serialise build report: {0}")]
    Report(#[from] serde_json::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{stderr}")
    }
}

/// Result type alias using [`DistError`].
pub type Result<T> = std::result::Result<T, DistError>;
