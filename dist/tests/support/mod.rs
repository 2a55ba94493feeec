//! Shared helpers for the distribution behaviour suites.
//!
//! Builds run against a [`ProjectFixture`] checkout with a scripted
//! executor, so no cmake, JDK or mdpdf installation is needed.

use camino::Utf8PathBuf;
use jetbeep_build::HostPlatform;
use jetbeep_dist::docs::converter_binary;
use jetbeep_dist::error::DistError;
use jetbeep_dist::graph::TaskId;
use jetbeep_dist::java::JdkTools;
use jetbeep_dist::pipeline::{BuildReport, DistRunner, PipelineContext, run_build};
use jetbeep_dist::test_utils::{CMAKE_ARGS, ExpectedCall, ProjectFixture, StubExecutor};
use std::fs::File;
use zip::ZipArchive;

/// What one scripted build produced.
pub struct BuildRun {
    /// The pipeline result.
    pub result: Result<BuildReport, DistError>,
    /// Where the archive is written on success.
    pub archive: Utf8PathBuf,
    /// Programs the executor was asked to run, in order.
    pub programs: Vec<String>,
}

/// Run a full distribution build of `fixture` for `host`.
///
/// With `native_fails` the scripted cmake exits non-zero and nothing else is
/// expected to run.
pub fn build_distribution(
    fixture: &ProjectFixture,
    host: &HostPlatform,
    native_fails: bool,
) -> BuildRun {
    let project = fixture.project();
    let tools = JdkTools::from_path();
    let context = PipelineContext {
        project: &project,
        host,
        tools: &tools,
        quiet: true,
    };
    let calls = if native_fails {
        vec![ExpectedCall::fails(
            "cmake",
            &CMAKE_ARGS,
            "make: *** [jetbeep-jni] Error 2",
        )]
    } else {
        ProjectFixture::full_build_calls(&converter_binary(host, None))
    };
    let executor = StubExecutor::new(calls);
    let mut runner = DistRunner::new(&context, &executor);
    let result = run_build(
        &context,
        TaskId::ArchiveAssemble,
        &mut runner,
        &mut std::io::sink(),
    );

    BuildRun {
        result,
        archive: context.distribution().archive_path(),
        programs: executor.programs(),
    }
}

/// Entry names of a zip archive with the `<example>-<version>/` root
/// folder removed.
pub fn archive_entries(path: &Utf8PathBuf) -> Vec<String> {
    let file = File::open(path).expect("open archive");
    let archive = ZipArchive::new(file).expect("valid zip");
    archive
        .file_names()
        .filter_map(|name| name.split_once('/').map(|(_, rest)| rest.to_owned()))
        .collect()
}
