//! Distribution archive naming, content collection and writing.
//!
//! # Sub-modules
//!
//! - [`assembly`] - Deterministic, atomic zip and tar.gz writing.
//! - [`checksum`] - SHA-256 sidecar files.
//! - [`collect`] - Native library discovery (`NativeArtefactSet`).
//! - [`distribution`] - What goes into the archive and where.
//! - [`naming`] - Archive naming policy (`DistributionName`).

pub mod assembly;
pub mod checksum;
pub mod collect;
pub mod distribution;
pub mod naming;

pub use collect::{NativeArtefactSet, PlatformFamily};
pub use distribution::{AssembledArchive, DistributionInputs, assemble};
pub use naming::DistributionName;
