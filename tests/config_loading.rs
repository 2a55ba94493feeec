//! Behaviour-driven tests for build settings loading.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use jetbeep_build::config::{DEFAULT_SETTINGS_FILE, JOBS_ENV};
use jetbeep_build::{ArchiveFormat, Project};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

/// A settings file in its own directory.
struct SettingsDir {
    _dir: TempDir,
    path: Utf8PathBuf,
}

impl SettingsDir {
    fn with_contents(contents: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
        let path = root.join(DEFAULT_SETTINGS_FILE);
        std::fs::write(&path, contents).expect("write settings");
        Self { _dir: dir, path }
    }
}

#[fixture]
fn settings() -> RefCell<Option<SettingsDir>> {
    RefCell::new(None)
}

#[fixture]
fn jobs_env() -> RefCell<Option<String>> {
    RefCell::new(None)
}

#[fixture]
fn load_result() -> RefCell<Option<Result<Project, String>>> {
    RefCell::new(None)
}

fn loaded<R>(
    load_result: &RefCell<Option<Result<Project, String>>>,
    check: impl FnOnce(&Project) -> R,
) -> R {
    let borrow = load_result.borrow();
    match borrow.as_ref() {
        Some(Ok(project)) => check(project),
        Some(Err(error)) => panic!("expected settings loading to succeed: {error}"),
        None => panic!("settings should be loaded"),
    }
}

#[given("a settings file containing only the version {version}")]
fn version_only(settings: &RefCell<Option<SettingsDir>>, version: String) {
    let version = version.trim_matches('"');
    settings.borrow_mut().replace(SettingsDir::with_contents(&format!(
        "[project]\nversion = \"{version}\"\n"
    )));
}

#[given("a settings file with an unknown key in the native table")]
fn unknown_key(settings: &RefCell<Option<SettingsDir>>) {
    settings.borrow_mut().replace(SettingsDir::with_contents(concat!(
        "[project]\n",
        "version = \"0.1.0\"\n",
        "\n",
        "[native]\n",
        "parallelism = 4\n",
    )));
}

#[given("a settings file without a version")]
fn no_version(settings: &RefCell<Option<SettingsDir>>) {
    settings.borrow_mut().replace(SettingsDir::with_contents(
        "[project]\nname = \"libjetbeep-jni\"\n",
    ));
}

#[given("JETBEEP_BUILD_JOBS is set to {value}")]
fn set_jobs(jobs_env: &RefCell<Option<String>>, value: String) {
    jobs_env
        .borrow_mut()
        .replace(value.trim_matches('"').to_owned());
}

#[when("the settings are loaded")]
fn load(
    settings: &RefCell<Option<SettingsDir>>,
    jobs_env: &RefCell<Option<String>>,
    load_result: &RefCell<Option<Result<Project, String>>>,
) {
    let path = settings
        .borrow()
        .as_ref()
        .map(|dir| dir.path.clone())
        .expect("settings file prepared");
    let jobs = jobs_env.borrow().clone();
    let outcome = temp_env::with_var(JOBS_ENV, jobs, || Project::load(&path))
        .map_err(|err| err.to_string());
    load_result.borrow_mut().replace(outcome);
}

#[then("loading succeeds")]
fn succeeds(load_result: &RefCell<Option<Result<Project, String>>>) {
    loaded(load_result, |_| ());
}

#[then("the native build runs {program} for target {target}")]
fn native_defaults(
    load_result: &RefCell<Option<Result<Project, String>>>,
    program: String,
    target: String,
) {
    loaded(load_result, |project| {
        let native = &project.settings().native;
        assert_eq!(native.program, program.trim_matches('"'));
        assert_eq!(native.target, target.trim_matches('"'));
        assert_eq!(native.jobs, None);
    });
}

#[then("the archive format is {format}")]
fn archive_format(load_result: &RefCell<Option<Result<Project, String>>>, format: String) {
    loaded(load_result, |project| {
        assert_eq!(project.settings().dist.format, ArchiveFormat::Zip);
        assert_eq!(
            project.settings().dist.format.to_string(),
            format.trim_matches('"')
        );
    });
}

#[then("the native build uses {jobs} jobs")]
fn jobs(load_result: &RefCell<Option<Result<Project, String>>>, jobs: usize) {
    loaded(load_result, |project| {
        assert_eq!(
            project.settings().native.jobs.map(std::num::NonZeroUsize::get),
            Some(jobs)
        );
    });
}

#[then("loading fails mentioning {snippet}")]
fn fails(load_result: &RefCell<Option<Result<Project, String>>>, snippet: String) {
    let snippet = snippet.trim_matches('"');
    let borrow = load_result.borrow();
    match borrow.as_ref() {
        Some(Err(error)) => assert!(
            error.contains(snippet),
            "expected error '{error}' to mention '{snippet}'"
        ),
        Some(Ok(_)) => panic!("expected settings loading to fail"),
        None => panic!("settings should be loaded"),
    }
}

#[scenario("tests/features/config_loading.feature", index = 0)]
fn scenario_defaults(
    settings: RefCell<Option<SettingsDir>>,
    jobs_env: RefCell<Option<String>>,
    load_result: RefCell<Option<Result<Project, String>>>,
) {
    let _ = (settings, jobs_env, load_result);
}

#[scenario("tests/features/config_loading.feature", index = 1)]
fn scenario_jobs_from_env(
    settings: RefCell<Option<SettingsDir>>,
    jobs_env: RefCell<Option<String>>,
    load_result: RefCell<Option<Result<Project, String>>>,
) {
    let _ = (settings, jobs_env, load_result);
}

#[scenario("tests/features/config_loading.feature", index = 2)]
fn scenario_invalid_jobs(
    settings: RefCell<Option<SettingsDir>>,
    jobs_env: RefCell<Option<String>>,
    load_result: RefCell<Option<Result<Project, String>>>,
) {
    let _ = (settings, jobs_env, load_result);
}

#[scenario("tests/features/config_loading.feature", index = 3)]
fn scenario_unknown_key(
    settings: RefCell<Option<SettingsDir>>,
    jobs_env: RefCell<Option<String>>,
    load_result: RefCell<Option<Result<Project, String>>>,
) {
    let _ = (settings, jobs_env, load_result);
}

#[scenario("tests/features/config_loading.feature", index = 4)]
fn scenario_version_required(
    settings: RefCell<Option<SettingsDir>>,
    jobs_env: RefCell<Option<String>>,
    load_result: RefCell<Option<Result<Project, String>>>,
) {
    let _ = (settings, jobs_env, load_result);
}
