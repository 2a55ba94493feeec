//! Java binding module and example application packaging.
//!
//! The binding JAR is stamped with `Implementation-Title` and
//! `Implementation-Version`; the example JAR carries `Main-Class`. Both are
//! compiled with the JDK's `javac`, and the binding module's Javadoc is
//! generated alongside for the distribution's `docs/` folder.

pub mod jar;
pub mod manifest;
mod packager;

pub use jar::JarContents;
pub use manifest::{JarManifest, ManifestError};
pub use packager::{
    COMPILE_STEP, JAVADOC_STEP, JavaArtefacts, JavaLayout, JavaPackager, JdkTools,
};
