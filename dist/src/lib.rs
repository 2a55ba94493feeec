//! jetbeep distribution builder.
//!
//! Orchestrates the jetbeep JNI build: the CMake native library, the Java
//! binding and example JARs, the README PDF and the platform-specific
//! distribution archive. Used by the `jetbeep-dist` binary and usable
//! programmatically with a scripted [`exec::CommandExecutor`].
//!
//! # Modules
//!
//! - [`artefact`] - Archive naming, native library collection and writing
//! - [`cli`] - Command-line argument definitions
//! - [`commands`] - Subcommand dispatch
//! - [`discover`] - Glob-based file discovery
//! - [`docs`] - README to PDF conversion
//! - [`error`] - Error types
//! - [`exec`] - External command execution
//! - [`graph`] - Task dependency graph and planning
//! - [`java`] - Java compilation, Javadoc and JAR packaging
//! - [`launcher`] - Start scripts for the example application
//! - [`native`] - CMake native build
//! - [`output`] - User-facing progress and summaries
//! - [`pipeline`] - Task execution and build reports

pub mod artefact;
pub mod cli;
pub mod commands;
pub mod discover;
pub mod docs;
pub mod error;
pub mod exec;
pub mod graph;
pub mod java;
pub mod launcher;
pub mod native;
pub mod output;
pub mod pipeline;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
