//! Unit tests for pipeline orchestration.

use super::*;
use crate::error::DistError;
use crate::test_utils::{CMAKE_ARGS, ExpectedCall, ProjectFixture, StubExecutor};
use mockall::Sequence;
use rstest::{fixture, rstest};
use std::fs::File;
use zip::ZipArchive;

#[fixture]
fn fixture() -> ProjectFixture {
    ProjectFixture::new()
}

fn linux() -> HostPlatform {
    HostPlatform::new("Linux", "amd64")
}

#[test]
fn execute_runs_tasks_in_plan_order() {
    let mut runner = MockTaskRunner::new();
    let mut sequence = Sequence::new();
    for task in [TaskId::NativeBuild, TaskId::JavaPackage] {
        runner
            .expect_run()
            .withf(move |requested| *requested == task)
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(TaskOutcome::NativeBuilt));
    }

    let mut stderr = Vec::new();
    let records = execute(
        &[TaskId::NativeBuild, TaskId::JavaPackage],
        &mut runner,
        false,
        &mut stderr,
    )
    .expect("both tasks succeed");
    assert_eq!(records.len(), 2);

    let progress = String::from_utf8(stderr).expect("utf8");
    assert!(progress.contains("[1/2] Building native library..."));
    assert!(progress.contains("[2/2] Packaging Java modules..."));
}

#[test]
fn execute_stops_at_first_failure() {
    let mut runner = MockTaskRunner::new();
    runner
        .expect_run()
        .withf(|task| *task == TaskId::NativeBuild)
        .times(1)
        .returning(|_| {
            Err(DistError::StepFailed {
                step: crate::native::STEP,
                command: "cmake --build .".to_owned(),
                status: "exit code 2".to_owned(),
                stderr: String::new(),
            })
        });

    let mut stderr = Vec::new();
    let err = execute(&TaskId::ALL, &mut runner, true, &mut stderr).expect_err("fails fast");
    assert!(matches!(err, DistError::StepFailed { .. }));
    assert!(stderr.is_empty(), "quiet mode prints nothing");
}

#[rstest]
fn full_build_produces_archive_and_report(fixture: ProjectFixture) {
    let project = fixture.project();
    let host = linux();
    let tools = JdkTools::from_path();
    let context = PipelineContext {
        project: &project,
        host: &host,
        tools: &tools,
        quiet: true,
    };
    let executor = StubExecutor::new(ProjectFixture::full_build_calls("mdpdf"));
    let mut runner = DistRunner::new(&context, &executor);

    let mut stderr = Vec::new();
    let report = run_build(&context, TaskId::ArchiveAssemble, &mut runner, &mut stderr)
        .expect("build succeeds");
    executor.assert_finished();

    assert_eq!(report.version, "0.1.0-alpha");
    assert_eq!(report.tasks.len(), 4);
    let archive = report.archive().expect("archive assembled");
    assert!(
        archive
            .path
            .as_str()
            .ends_with("build/distributions/libjetbeep-jni-0.1.0-alpha-linux-amd64.zip")
    );
    assert!(archive.checksum_path.is_file());
    assert_eq!(archive.native_libraries, ["libjetbeep-jni.so"]);

    let mut zip = ZipArchive::new(File::open(&archive.path).expect("open")).expect("valid zip");
    for expected in [
        "example-0.1.0-alpha/README.pdf",
        "example-0.1.0-alpha/bin/example",
        "example-0.1.0-alpha/bin/example.bat",
        "example-0.1.0-alpha/docs/javadoc/index.html",
        "example-0.1.0-alpha/lib/example-0.1.0-alpha.jar",
        "example-0.1.0-alpha/lib/libjetbeep-jni-java-0.1.0-alpha.jar",
        "example-0.1.0-alpha/libjetbeep-jni/libjetbeep-jni.so",
        "example-0.1.0-alpha/src/main/java/example/Main.java",
    ] {
        assert!(zip.by_name(expected).is_ok(), "missing {expected}");
    }

    let json = serde_json::to_value(&report).expect("serialise");
    assert_eq!(json["tasks"][0]["outcome"]["kind"], "native-built");
    assert_eq!(json["tasks"][3]["task"], "archive-assemble");
}

#[rstest]
fn native_failure_leaves_no_archive(fixture: ProjectFixture) {
    let project = fixture.project();
    let host = linux();
    let tools = JdkTools::from_path();
    let context = PipelineContext {
        project: &project,
        host: &host,
        tools: &tools,
        quiet: true,
    };
    let stale = context.distribution().archive_path();
    crate::test_utils::write_file(&stale, b"from an earlier run");

    let executor = StubExecutor::new(vec![ExpectedCall::fails(
        "cmake",
        &CMAKE_ARGS,
        "ninja: build stopped: subcommand failed.",
    )]);
    let mut runner = DistRunner::new(&context, &executor);

    let mut stderr = Vec::new();
    let err = run_build(&context, TaskId::ArchiveAssemble, &mut runner, &mut stderr)
        .expect_err("native build fails");
    assert!(err.to_string().contains("native build failed"));
    assert!(!stale.exists());
    assert_eq!(executor.programs(), ["cmake"]);
}

#[rstest]
fn skipping_pdf_removes_conversion_from_the_plan(fixture: ProjectFixture) {
    let mut project = fixture.project();
    project.settings_mut().example.pdf = false;
    let host = linux();
    let tools = JdkTools::from_path();
    let context = PipelineContext {
        project: &project,
        host: &host,
        tools: &tools,
        quiet: true,
    };

    let plan = context.graph().plan(TaskId::ArchiveAssemble).expect("plan");
    assert!(!plan.contains(&TaskId::DocConvert));
    assert!(!context.distribution().include_pdf);
}

#[rstest]
fn dry_run_descriptions_name_the_commands(fixture: ProjectFixture) {
    let project = fixture.project();
    let host = HostPlatform::new("Windows 10", "amd64");
    let tools = JdkTools::from_path();
    let context = PipelineContext {
        project: &project,
        host: &host,
        tools: &tools,
        quiet: false,
    };

    assert!(
        context
            .describe_action(TaskId::NativeBuild)
            .starts_with("`cmake --build . --target jetbeep-jni`")
    );
    assert!(
        context
            .describe_action(TaskId::DocConvert)
            .starts_with("`mdpdf.cmd README.md`")
    );
    assert!(
        context
            .describe_action(TaskId::ArchiveAssemble)
            .ends_with("libjetbeep-jni-0.1.0-alpha-windows_10-amd64.zip")
    );
}
