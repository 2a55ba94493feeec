//! Subcommand dispatch for the `jetbeep-dist` binary.
//!
//! `main.rs` loads the project and picks the real executor; everything after
//! that lives here so integration tests can drive whole invocations with a
//! scripted executor.

use crate::cli::{Cli, Command, GlobalArgs};
use crate::error::Result;
use crate::exec::{CommandExecutor, SystemCommandExecutor};
use crate::graph::TaskId;
use crate::output::{DryRunInfo, success_message, write_stderr_line};
use crate::pipeline::{DistRunner, PipelineContext, run_build};
use jetbeep_build::{BuildSettings, HostPlatform, Project};
use log::debug;
use std::io::Write;
use std::time::Duration;

/// Load the settings named by `--config` and apply command-line overrides.
///
/// # Errors
///
/// Returns any settings or version error.
pub fn load_project(options: &GlobalArgs) -> Result<Project> {
    let mut project = Project::load(&options.config)?;
    apply_overrides(project.settings_mut(), options);
    Ok(project)
}

/// Apply flags that override settings. Environment overrides have already
/// been applied, so flags win over both.
pub fn apply_overrides(settings: &mut BuildSettings, options: &GlobalArgs) {
    if let Some(jobs) = options.jobs {
        settings.native.jobs = Some(jobs);
    }
    if let Some(format) = options.format {
        settings.dist.format = format.into();
    }
    if options.skip_pdf {
        settings.example.pdf = false;
    }
}

/// The host platform, with any `--os-name`/`--os-arch` overrides.
#[must_use]
pub fn host_platform(options: &GlobalArgs) -> HostPlatform {
    HostPlatform::detect().with_overrides(options.os_name.as_deref(), options.os_arch.as_deref())
}

/// The process executor, honouring `tools.timeout_secs`.
#[must_use]
pub fn system_executor(project: &Project) -> SystemCommandExecutor {
    match project.settings().tools.timeout_secs {
        Some(seconds) => SystemCommandExecutor::with_timeout(Duration::from_secs(seconds)),
        None => SystemCommandExecutor::new(),
    }
}

/// Run the subcommand selected by `cli`.
///
/// Build output and the JSON report go to `stdout`; progress, dry-run
/// information and the success summary go to `stderr`.
///
/// # Errors
///
/// Returns planning errors, the first task failure, or a failure to write
/// to `stdout`.
pub fn run_command(
    cli: &Cli,
    context: &PipelineContext<'_>,
    executor: &dyn CommandExecutor,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<()> {
    let options = &cli.options;
    let command = cli.command();
    let Some(target) = command.target() else {
        return match command {
            Command::Plan { task } => print_plan(context, task, options.json, stdout),
            _ => print_name(context, options.json, stdout),
        };
    };

    if options.dry_run {
        print_dry_run(context, target, stderr)?;
        return Ok(());
    }

    debug!("running {target} for {}", context.host);
    let mut runner = DistRunner::new(context, executor);
    let report = run_build(context, target, &mut runner, stderr)?;

    if let Some(archive) = report.archive().filter(|_| !context.quiet) {
        write_stderr_line(stderr, "");
        write_stderr_line(stderr, success_message(archive));
    }
    if options.json {
        serde_json::to_writer_pretty(&mut *stdout, &report)?;
        writeln!(stdout)?;
    }
    Ok(())
}

fn print_plan(
    context: &PipelineContext<'_>,
    task: Option<TaskId>,
    json: bool,
    stdout: &mut dyn Write,
) -> Result<()> {
    let graph = context.graph();
    let plan = match task {
        Some(task) => graph.plan(task)?,
        None => graph.order()?,
    };
    if json {
        serde_json::to_writer(&mut *stdout, &plan)?;
        writeln!(stdout)?;
    } else {
        for task in plan {
            writeln!(stdout, "{task}")?;
        }
    }
    Ok(())
}

fn print_name(context: &PipelineContext<'_>, json: bool, stdout: &mut dyn Write) -> Result<()> {
    let inputs = context.distribution();
    if json {
        let value = serde_json::json!({
            "name": inputs.name.filename(),
            "path": inputs.archive_path(),
        });
        serde_json::to_writer(&mut *stdout, &value)?;
        writeln!(stdout)?;
    } else {
        writeln!(stdout, "{}", inputs.name)?;
    }
    Ok(())
}

fn print_dry_run(
    context: &PipelineContext<'_>,
    target: TaskId,
    stderr: &mut dyn Write,
) -> Result<()> {
    let plan = context.graph().plan(target)?;
    let archive = context.distribution().archive_path();
    let project = context.project;
    let info = DryRunInfo {
        project_root: project.root(),
        project: project.name(),
        version: project.version().as_str(),
        platform: context.host.to_string(),
        archive: &archive,
        steps: plan
            .iter()
            .map(|task| (*task, context.describe_action(*task)))
            .collect(),
    };
    write_stderr_line(stderr, info.display_text());
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
