//! Distribution contents and assembly.
//!
//! Archive layout under `<example>-<version>/`:
//!
//! ```text
//! libjetbeep-jni/      native libraries, one per platform family
//! lib/                 example and binding JARs
//! bin/                 start scripts
//! docs/                generated Java documentation
//! src/                 example sources
//! README.md
//! README.pdf           when conversion is enabled
//! ```

use super::assembly::{DistributionLayout, EXEC_MODE, FILE_MODE};
use super::checksum::{sidecar_path, write_sidecar};
use super::collect::NativeArtefactSet;
use super::naming::DistributionName;
use crate::error::{DistError, Result};
use crate::java::JavaLayout;
use crate::launcher::LauncherSpec;
use camino::{Utf8Path, Utf8PathBuf};
use jetbeep_build::{HostPlatform, Project};
use log::info;
use serde::Serialize;

/// Everything the assembler reads, resolved from settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionInputs {
    /// Archive name.
    pub name: DistributionName,
    /// Top-level folder inside the archive: `<example>-<version>`.
    pub root_dir: String,
    /// Directory the native libraries are collected from.
    pub native_dir: Utf8PathBuf,
    /// Archive folder for the native libraries.
    pub native_dir_name: String,
    /// JARs placed in `lib/`, in classpath order.
    pub jars: Vec<Utf8PathBuf>,
    /// Start script inputs.
    pub launcher: LauncherSpec,
    /// README shipped at the archive root.
    pub readme: Utf8PathBuf,
    /// Ship the converted `README.pdf` beside the README.
    pub include_pdf: bool,
    /// Generated documentation, shipped as `docs/` when present.
    pub docs_dir: Option<Utf8PathBuf>,
    /// Example source tree, shipped as `src/`.
    pub example_sources: Utf8PathBuf,
    /// Directory the archive is written to.
    pub output_dir: Utf8PathBuf,
}

impl DistributionInputs {
    /// Resolve inputs from project settings for `host`.
    #[must_use]
    pub fn from_project(project: &Project, java: &JavaLayout, host: &HostPlatform) -> Self {
        let settings = project.settings();
        let name = DistributionName::new(
            project.name(),
            project.version(),
            host,
            settings.dist.format,
        );
        let jars = java.runtime_jars();
        let launcher = LauncherSpec {
            name: java.example().to_owned(),
            main_class: java.main_class().to_owned(),
            jvm_args: settings.example.jvm_args.clone(),
            jars: jars
                .iter()
                .filter_map(|jar| jar.file_name().map(str::to_owned))
                .collect(),
        };
        let docs = java.docs_dir();
        let docs_dir = (java.javadoc_enabled() || docs.is_dir()).then_some(docs);

        Self {
            name,
            root_dir: format!("{}-{}", java.example(), project.version()),
            native_dir: project.path(&settings.native.output_dir),
            native_dir_name: settings.dist.native_dir_name.clone(),
            jars,
            launcher,
            readme: project.path(&settings.example.readme),
            include_pdf: settings.example.pdf,
            docs_dir,
            example_sources: java.example_tree().to_owned(),
            output_dir: project.path(&settings.dist.output_dir),
        }
    }

    /// Where the archive is written.
    #[must_use]
    pub fn archive_path(&self) -> Utf8PathBuf {
        self.output_dir.join(self.name.filename())
    }

    /// Collect every input into a layout.
    ///
    /// # Errors
    ///
    /// Fails when a required input is missing or the native libraries are
    /// ambiguous.
    pub fn layout(&self) -> Result<(DistributionLayout, NativeArtefactSet)> {
        let mut layout = DistributionLayout::new(self.root_dir.clone());

        let native = NativeArtefactSet::collect(&self.native_dir)?;
        for (_, library) in native.iter() {
            let file_name = library.file_name().unwrap_or(library.as_str());
            layout.add_file(
                &format!("{}/{file_name}", self.native_dir_name),
                library,
                FILE_MODE,
            );
        }

        for jar in &self.jars {
            require_file("JAR", jar)?;
            let file_name = jar.file_name().unwrap_or(jar.as_str());
            layout.add_file(&format!("lib/{file_name}"), jar, FILE_MODE);
        }

        let script = &self.launcher.name;
        layout.add_bytes(&format!("bin/{script}"), self.launcher.unix_script(), EXEC_MODE);
        layout.add_bytes(
            &format!("bin/{script}.bat"),
            self.launcher.windows_script(),
            EXEC_MODE,
        );

        require_file("README", &self.readme)?;
        layout.add_file("README.md", &self.readme, FILE_MODE);
        if self.include_pdf {
            let pdf = self.readme.with_extension("pdf");
            require_file("README.pdf", &pdf)?;
            layout.add_file("README.pdf", &pdf, FILE_MODE);
        }

        if let Some(docs) = &self.docs_dir {
            layout.add_tree("docs", docs, "documentation directory")?;
        }
        layout.add_tree("src", &self.example_sources, "example source directory")?;

        Ok((layout, native))
    }
}

/// The result of a successful assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledArchive {
    /// Archive path.
    pub path: Utf8PathBuf,
    /// Checksum sidecar path.
    pub checksum_path: Utf8PathBuf,
    /// Lowercase hex SHA-256 of the archive.
    pub sha256: String,
    /// Number of files in the archive.
    pub entries: usize,
    /// File names of the bundled native libraries.
    pub native_libraries: Vec<String>,
}

/// Build the archive and its checksum sidecar.
///
/// # Errors
///
/// Propagates layout, write and checksum failures. No archive is left at
/// the final path when this fails before the rename.
pub fn assemble(inputs: &DistributionInputs) -> Result<AssembledArchive> {
    let (layout, native) = inputs.layout()?;
    let path = inputs.archive_path();
    info!("assembling {} ({} entries)", inputs.name, layout.len());

    layout.write(&path, inputs.name.format())?;
    let sha256 = write_sidecar(&path)?;

    Ok(AssembledArchive {
        checksum_path: sidecar_path(&path),
        path,
        sha256,
        entries: layout.len(),
        native_libraries: native
            .iter()
            .filter_map(|(_, library)| library.file_name().map(str::to_owned))
            .collect(),
    })
}

fn require_file(what: &'static str, path: &Utf8Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(DistError::MissingInput {
            what,
            path: path.to_owned(),
        })
    }
}
