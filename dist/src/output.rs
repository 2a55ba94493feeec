//! User-facing output for the `jetbeep-dist` CLI.
//!
//! Progress and summaries go to stderr; the optional JSON report goes to
//! stdout so it can be piped.

use crate::artefact::AssembledArchive;
use crate::graph::TaskId;
use camino::Utf8Path;
use std::io::Write;

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}

/// Render `err` and its chain of sources as one line.
///
/// # Examples
///
/// ```
/// use jetbeep_dist::output::error_report;
///
/// let err = std::io::Error::other("disk full");
/// assert_eq!(error_report(&err), "disk full");
/// ```
#[must_use]
pub fn error_report(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// What a task does, as shown in progress lines.
#[must_use]
pub const fn describe(task: TaskId) -> &'static str {
    match task {
        TaskId::NativeBuild => "Building native library",
        TaskId::JavaPackage => "Packaging Java modules",
        TaskId::DocConvert => "Converting README to PDF",
        TaskId::ArchiveAssemble => "Assembling distribution archive",
    }
}

/// Progress line shown before a task starts.
///
/// # Examples
///
/// ```
/// use jetbeep_dist::graph::TaskId;
/// use jetbeep_dist::output::progress_line;
///
/// assert_eq!(
///     progress_line(1, 4, TaskId::NativeBuild),
///     "[1/4] Building native library..."
/// );
/// ```
#[must_use]
pub fn progress_line(position: usize, total: usize, task: TaskId) -> String {
    format!("[{position}/{total}] {}...", describe(task))
}

/// Summary shown once the archive is written.
#[must_use]
pub fn success_message(archive: &AssembledArchive) -> String {
    let plural = if archive.native_libraries.len() == 1 {
        "library"
    } else {
        "libraries"
    };
    format!(
        "Created {} ({} files, {} native {plural})\nSHA-256: {}",
        archive.path,
        archive.entries,
        archive.native_libraries.len(),
        archive.sha256
    )
}

/// Configuration shown by `--dry-run`.
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// Project root directory.
    pub project_root: &'a Utf8Path,
    /// Project name.
    pub project: &'a str,
    /// Resolved version.
    pub version: &'a str,
    /// Platform the archive is named for.
    pub platform: String,
    /// Archive that would be written.
    pub archive: &'a Utf8Path,
    /// Tasks in execution order, each with the command it would run.
    pub steps: Vec<(TaskId, String)>,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let mut lines = vec![
            "Dry run - no commands will be executed".to_owned(),
            String::new(),
            format!("Project root: {}", self.project_root),
            format!("Project: {} {}", self.project, self.version),
            format!("Platform: {}", self.platform),
            format!("Archive: {}", self.archive),
            String::new(),
            "Tasks:".to_owned(),
        ];
        for (index, (task, action)) in self.steps.iter().enumerate() {
            lines.push(format!("  {}. {task}: {action}", index + 1));
        }
        lines.join("\n")
    }
}
