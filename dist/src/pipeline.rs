//! Build pipeline orchestration.
//!
//! Runs a planned sequence of tasks through a [`TaskRunner`], one at a time,
//! stopping at the first failure. [`DistRunner`] is the real runner wiring
//! each task to its build step.

use crate::artefact::{AssembledArchive, DistributionInputs, assemble};
use crate::artefact::checksum::sidecar_path;
use crate::docs::{ReadmeConverter, converter_binary, readme_dir};
use crate::error::Result;
use crate::exec::CommandExecutor;
use crate::graph::{TaskGraph, TaskId};
use crate::java::{JavaArtefacts, JavaLayout, JavaPackager, JdkTools};
use crate::native::{NativeBuildConfig, NativeBuilder};
use crate::output::{progress_line, write_stderr_line};
use camino::{Utf8Path, Utf8PathBuf};
use jetbeep_build::{HostPlatform, Project};
use log::{debug, info};
use serde::Serialize;
use std::io::Write;

/// What a finished task produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TaskOutcome {
    /// The native build succeeded.
    NativeBuilt,
    /// The JARs were written.
    JavaPackaged(JavaArtefacts),
    /// The README PDF was written.
    ReadmeConverted {
        /// The generated PDF.
        pdf: Utf8PathBuf,
    },
    /// The archive and its checksum were written.
    Assembled(AssembledArchive),
}

/// Runs a single task.
#[cfg_attr(test, mockall::automock)]
pub trait TaskRunner {
    /// Run `task` to completion.
    ///
    /// # Errors
    ///
    /// Returns the task's failure; the pipeline stops on the first error.
    fn run(&mut self, task: TaskId) -> Result<TaskOutcome>;
}

/// A completed task and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRecord {
    /// The task.
    pub task: TaskId,
    /// What it produced.
    pub outcome: TaskOutcome,
}

/// Machine-readable summary of a run, printed by `--json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Project name.
    pub project: String,
    /// Project version shared by every artefact.
    pub version: String,
    /// Normalised OS qualifier.
    pub os_name: String,
    /// Normalised architecture qualifier.
    pub os_arch: String,
    /// Completed tasks in execution order.
    pub tasks: Vec<TaskRecord>,
}

impl BuildReport {
    /// The assembled archive, if the run produced one.
    #[must_use]
    pub fn archive(&self) -> Option<&AssembledArchive> {
        self.tasks.iter().find_map(|record| match &record.outcome {
            TaskOutcome::Assembled(archive) => Some(archive),
            _ => None,
        })
    }
}

/// Run `plan` in order through `runner`, printing progress unless `quiet`.
///
/// # Errors
///
/// Returns the first task failure; later tasks never start.
pub fn execute(
    plan: &[TaskId],
    runner: &mut dyn TaskRunner,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<Vec<TaskRecord>> {
    let mut records = Vec::with_capacity(plan.len());
    for (index, task) in plan.iter().copied().enumerate() {
        if !quiet {
            write_stderr_line(stderr, progress_line(index + 1, plan.len(), task));
        }
        info!("starting task {task}");
        let outcome = runner.run(task)?;
        debug!("task {task} finished: {outcome:?}");
        records.push(TaskRecord { task, outcome });
    }
    Ok(records)
}

/// Everything a run needs, resolved once up front.
pub struct PipelineContext<'a> {
    /// Loaded project with its resolved version.
    pub project: &'a Project,
    /// Platform the archive is named for.
    pub host: &'a HostPlatform,
    /// JDK tool locations.
    pub tools: &'a JdkTools,
    /// Suppress progress output.
    pub quiet: bool,
}

impl PipelineContext<'_> {
    /// The task graph for this project's settings.
    #[must_use]
    pub fn graph(&self) -> TaskGraph {
        TaskGraph::standard(self.project.settings().example.pdf)
    }

    /// The Java build locations.
    #[must_use]
    pub fn java_layout(&self) -> JavaLayout {
        JavaLayout::from_project(self.project)
    }

    /// The archive inputs.
    #[must_use]
    pub fn distribution(&self) -> DistributionInputs {
        DistributionInputs::from_project(self.project, &self.java_layout(), self.host)
    }

    /// One-line description of what `task` would do, for dry runs.
    #[must_use]
    pub fn describe_action(&self, task: TaskId) -> String {
        match task {
            TaskId::NativeBuild => {
                let config = NativeBuildConfig::from_project(self.project);
                format!("`{}` in {}", config.command(), config.build_dir)
            }
            TaskId::JavaPackage => {
                let layout = self.java_layout();
                format!(
                    "{} -> {}, {}",
                    self.tools.javac,
                    layout.library_jar(),
                    layout.example_jar()
                )
            }
            TaskId::DocConvert => {
                let settings = self.project.settings();
                let binary = converter_binary(self.host, settings.tools.mdpdf.as_deref());
                let readme = self.project.path(&settings.example.readme);
                format!(
                    "`{binary} {}` in {}",
                    readme.file_name().unwrap_or("README.md"),
                    readme_dir(&readme)
                )
            }
            TaskId::ArchiveAssemble => format!("write {}", self.distribution().archive_path()),
        }
    }
}

/// Runs each task against the real project.
pub struct DistRunner<'a> {
    context: &'a PipelineContext<'a>,
    executor: &'a dyn CommandExecutor,
}

impl<'a> DistRunner<'a> {
    /// Create a runner that executes tools through `executor`.
    #[must_use]
    pub fn new(context: &'a PipelineContext<'a>, executor: &'a dyn CommandExecutor) -> Self {
        Self { context, executor }
    }
}

impl TaskRunner for DistRunner<'_> {
    fn run(&mut self, task: TaskId) -> Result<TaskOutcome> {
        let context = self.context;
        match task {
            TaskId::NativeBuild => {
                let config = NativeBuildConfig::from_project(context.project);
                NativeBuilder::new(config, self.executor).build()?;
                Ok(TaskOutcome::NativeBuilt)
            }
            TaskId::JavaPackage => {
                let layout = context.java_layout();
                let artefacts = JavaPackager::new(&layout, context.tools, self.executor).package()?;
                Ok(TaskOutcome::JavaPackaged(artefacts))
            }
            TaskId::DocConvert => {
                let pdf = ReadmeConverter::for_project(context.project, context.host, self.executor)
                    .convert()?;
                Ok(TaskOutcome::ReadmeConverted { pdf })
            }
            TaskId::ArchiveAssemble => {
                let archive = assemble(&context.distribution())?;
                Ok(TaskOutcome::Assembled(archive))
            }
        }
    }
}

/// Plan and run `target` with its dependencies.
///
/// When the plan ends in an archive, any archive left at the final path by
/// an earlier run is removed first, so a failed run leaves none behind.
///
/// # Errors
///
/// Returns planning errors and the first task failure.
pub fn run_build(
    context: &PipelineContext<'_>,
    target: TaskId,
    runner: &mut dyn TaskRunner,
    stderr: &mut dyn Write,
) -> Result<BuildReport> {
    let plan = context.graph().plan(target)?;
    if plan.contains(&TaskId::ArchiveAssemble) {
        remove_stale_archive(&context.distribution().archive_path())?;
    }

    let tasks = execute(&plan, runner, context.quiet, stderr)?;
    Ok(BuildReport {
        project: context.project.name().to_owned(),
        version: context.project.version().to_string(),
        os_name: context.host.os_qualifier(),
        os_arch: context.host.arch_qualifier(),
        tasks,
    })
}

fn remove_stale_archive(archive: &Utf8Path) -> Result<()> {
    for path in [archive.to_owned(), sidecar_path(archive)] {
        if path.is_file() {
            debug!("removing stale {path}");
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
