//! Shared project model for the jetbeep JNI build.
//!
//! This crate owns the pieces every build step agrees on: the settings file,
//! the single project version, and the host platform qualifiers that end up
//! in distribution archive names. The `jetbeep-dist` orchestrator consumes it.
//!
//! # Modules
//!
//! - [`config`] - `jetbeep-build.toml` schema, environment overrides and
//!   project root binding
//! - [`error`] - Settings and version errors
//! - [`platform`] - Host OS/architecture detection and normalisation
//! - [`version`] - Version sources and validation

pub mod config;
pub mod error;
pub mod platform;
pub mod version;

pub use config::{ArchiveFormat, BuildSettings, Project};
pub use error::ConfigError;
pub use platform::HostPlatform;
pub use version::{ProjectVersion, VersionSource};
