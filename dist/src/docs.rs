//! README to PDF conversion through the external `mdpdf` tool.

use crate::error::{DistError, Result};
use crate::exec::{CommandExecutor, CommandSpec, run_step};
use camino::{Utf8Path, Utf8PathBuf};
use jetbeep_build::{HostPlatform, Project};
use log::info;

/// Label used in progress output and errors.
pub const STEP: &str = "README conversion";

/// Converter binary name on Windows hosts, where npm installs a shim.
pub const WINDOWS_BINARY: &str = "mdpdf.cmd";

/// Converter binary name elsewhere.
pub const DEFAULT_BINARY: &str = "mdpdf";

/// Pick the converter binary for `host`, honouring an explicit override.
///
/// # Examples
///
/// ```
/// use jetbeep_build::HostPlatform;
/// use jetbeep_dist::docs::converter_binary;
///
/// let windows = HostPlatform::new("Windows 10", "amd64");
/// assert_eq!(converter_binary(&windows, None), "mdpdf.cmd");
/// let linux = HostPlatform::new("Linux", "amd64");
/// assert_eq!(converter_binary(&linux, None), "mdpdf");
/// ```
#[must_use]
pub fn converter_binary(host: &HostPlatform, override_binary: Option<&str>) -> String {
    match override_binary {
        Some(binary) => binary.to_owned(),
        None if host.is_windows() => WINDOWS_BINARY.to_owned(),
        None => DEFAULT_BINARY.to_owned(),
    }
}

/// Converts the example README into `README.pdf` next to it.
pub struct ReadmeConverter<'a> {
    binary: String,
    readme: Utf8PathBuf,
    executor: &'a dyn CommandExecutor,
}

impl<'a> ReadmeConverter<'a> {
    /// Create a converter for `readme`.
    #[must_use]
    pub fn new(
        binary: impl Into<String>,
        readme: Utf8PathBuf,
        executor: &'a dyn CommandExecutor,
    ) -> Self {
        Self {
            binary: binary.into(),
            readme,
            executor,
        }
    }

    /// Create a converter from project settings and the host platform.
    #[must_use]
    pub fn for_project(
        project: &Project,
        host: &HostPlatform,
        executor: &'a dyn CommandExecutor,
    ) -> Self {
        let settings = project.settings();
        let binary = converter_binary(host, settings.tools.mdpdf.as_deref());
        Self::new(binary, project.path(&settings.example.readme), executor)
    }

    /// The PDF this converter produces.
    #[must_use]
    pub fn output(&self) -> Utf8PathBuf {
        self.readme.with_extension("pdf")
    }

    /// The command this converter runs.
    #[must_use]
    pub fn command(&self) -> CommandSpec {
        CommandSpec::new(&self.binary)
            .arg(self.readme.file_name().unwrap_or("README.md"))
            .current_dir(readme_dir(&self.readme))
    }

    /// Run the conversion and return the PDF path.
    ///
    /// # Errors
    ///
    /// Returns [`DistError::MissingInput`] when the README is absent,
    /// [`DistError::StepFailed`] when the tool fails, and
    /// [`DistError::ConversionOutputMissing`] when it exits cleanly without
    /// writing the PDF.
    pub fn convert(&self) -> Result<Utf8PathBuf> {
        if !self.readme.is_file() {
            return Err(DistError::MissingInput {
                what: "README",
                path: self.readme.clone(),
            });
        }

        let output = self.output();
        // Clear a PDF left by an earlier run.
        if output.is_file() {
            std::fs::remove_file(&output)?;
        }

        info!("converting {} to PDF with {}", self.readme, self.binary);
        run_step(self.executor, STEP, &self.command())?;

        if !output.is_file() {
            return Err(DistError::ConversionOutputMissing { path: output });
        }
        Ok(output)
    }
}

/// The README's directory, or `.` for a bare file name.
#[must_use]
pub fn readme_dir(readme: &Utf8Path) -> &Utf8Path {
    readme
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."))
}
