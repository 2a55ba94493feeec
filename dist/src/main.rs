//! `jetbeep-dist` CLI entrypoint.
//!
//! Builds the native library, packages the Java bindings and the example,
//! converts the example README and assembles the distribution archive.

use clap::Parser;
use jetbeep_dist::cli::{Cli, GlobalArgs};
use jetbeep_dist::commands::{host_platform, load_project, run_command, system_executor};
use jetbeep_dist::error::Result;
use jetbeep_dist::java::JdkTools;
use jetbeep_dist::output::{error_report, write_stderr_line};
use jetbeep_dist::pipeline::PipelineContext;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.options);
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// `RUST_LOG` takes precedence over the `-v`/`-q` default.
fn init_logging(options: &GlobalArgs) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(options.log_filter()))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    let project = load_project(&cli.options)?;
    let host = host_platform(&cli.options);
    let tools = JdkTools::detect(&project);
    let executor = system_executor(&project);
    let context = PipelineContext {
        project: &project,
        host: &host,
        tools: &tools,
        quiet: cli.options.quiet,
    };
    run_command(cli, &context, &executor, stdout, stderr)
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {}", error_report(&err)));
            1
        }
    }
}
