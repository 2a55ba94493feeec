//! Native library build driver.
//!
//! Drives the pre-configured CMake build tree to produce the `jetbeep-jni`
//! shared library. The build tree itself (generator, toolchain, options) is
//! configured outside this tool; this module only invokes the build.

use crate::error::{DistError, Result};
use crate::exec::{CommandExecutor, CommandSpec, run_step};
use camino::Utf8PathBuf;
use jetbeep_build::Project;
use log::info;
use std::num::NonZeroUsize;

/// Label used in progress output and errors.
pub const STEP: &str = "native build";

/// Configuration for the native build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeBuildConfig {
    /// Build tool executable.
    pub program: String,
    /// Build tree the tool runs in.
    pub build_dir: Utf8PathBuf,
    /// Target to build.
    pub target: String,
    /// Number of parallel compile jobs (None for the generator default).
    pub jobs: Option<NonZeroUsize>,
}

impl NativeBuildConfig {
    /// Derive the configuration from project settings.
    #[must_use]
    pub fn from_project(project: &Project) -> Self {
        let native = &project.settings().native;
        Self {
            program: native.program.clone(),
            build_dir: project.path(&native.build_dir),
            target: native.target.clone(),
            jobs: native.jobs,
        }
    }

    /// The command this configuration runs.
    ///
    /// The job count is forwarded to the native build tool after `--`, which
    /// keeps it compatible with generators that predate `cmake --parallel`.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8PathBuf;
    /// use jetbeep_dist::native::NativeBuildConfig;
    /// use std::num::NonZeroUsize;
    ///
    /// let config = NativeBuildConfig {
    ///     program: "cmake".to_owned(),
    ///     build_dir: Utf8PathBuf::from("../build"),
    ///     target: "jetbeep-jni".to_owned(),
    ///     jobs: NonZeroUsize::new(10),
    /// };
    /// assert_eq!(
    ///     config.command().to_string(),
    ///     "cmake --build . --target jetbeep-jni -- -j 10"
    /// );
    /// ```
    #[must_use]
    pub fn command(&self) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.program)
            .args(["--build", ".", "--target", &self.target])
            .current_dir(self.build_dir.clone());
        if let Some(jobs) = self.jobs {
            spec = spec.args(["--", "-j", &jobs.to_string()]);
        }
        spec
    }
}

/// Runs the native build.
pub struct NativeBuilder<'a> {
    config: NativeBuildConfig,
    executor: &'a dyn CommandExecutor,
}

impl<'a> NativeBuilder<'a> {
    /// Create a builder that runs commands through `executor`.
    #[must_use]
    pub fn new(config: NativeBuildConfig, executor: &'a dyn CommandExecutor) -> Self {
        Self { config, executor }
    }

    /// Build the configured target.
    ///
    /// # Errors
    ///
    /// Returns [`DistError::MissingInput`] when the build tree does not
    /// exist, or [`DistError::StepFailed`] when the tool exits non-zero.
    pub fn build(&self) -> Result<()> {
        if !self.config.build_dir.is_dir() {
            return Err(DistError::MissingInput {
                what: "native build tree",
                path: self.config.build_dir.clone(),
            });
        }

        let spec = self.config.command();
        info!("building native target {} in {}", self.config.target, self.config.build_dir);
        run_step(self.executor, STEP, &spec)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::MockCommandExecutor;
    use crate::test_utils::{failure_output, success_output};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct BuildTree {
        _dir: TempDir,
        path: Utf8PathBuf,
    }

    #[fixture]
    fn build_tree() -> BuildTree {
        let dir = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8");
        BuildTree { _dir: dir, path }
    }

    fn config(build_dir: Utf8PathBuf, jobs: Option<usize>) -> NativeBuildConfig {
        NativeBuildConfig {
            program: "cmake".to_owned(),
            build_dir,
            target: "jetbeep-jni".to_owned(),
            jobs: jobs.and_then(NonZeroUsize::new),
        }
    }

    #[rstest]
    #[case::no_jobs(None, &["--build", ".", "--target", "jetbeep-jni"])]
    #[case::ten_jobs(
        Some(10),
        &["--build", ".", "--target", "jetbeep-jni", "--", "-j", "10"]
    )]
    fn command_arguments(#[case] jobs: Option<usize>, #[case] expected: &[&str]) {
        let spec = config(Utf8PathBuf::from("../build"), jobs).command();
        assert_eq!(spec.program(), "cmake");
        assert_eq!(spec.arg_list(), expected);
        assert_eq!(spec.cwd().map(|dir| dir.as_str()), Some("../build"));
    }

    #[rstest]
    fn build_runs_command_in_build_tree(build_tree: BuildTree) {
        let expected_cwd = build_tree.path.clone();
        let mut executor = MockCommandExecutor::new();
        executor
            .expect_run()
            .withf(move |spec| spec.program() == "cmake" && spec.cwd() == Some(expected_cwd.as_path()))
            .times(1)
            .returning(|_| Ok(success_output()));

        NativeBuilder::new(config(build_tree.path.clone(), None), &executor)
            .build()
            .expect("build succeeds");
    }

    #[rstest]
    fn build_failure_is_fatal(build_tree: BuildTree) {
        let mut executor = MockCommandExecutor::new();
        executor
            .expect_run()
            .times(1)
            .returning(|_| Ok(failure_output("jni.h: No such file or directory")));

        let err = NativeBuilder::new(config(build_tree.path.clone(), Some(10)), &executor)
            .build()
            .expect_err("build must fail");
        let msg = err.to_string();
        assert!(msg.contains("native build failed"));
        assert!(msg.contains("-j 10"));
        assert!(msg.contains("jni.h"));
    }

    #[test]
    fn missing_build_tree_is_reported_before_running() {
        let executor = MockCommandExecutor::new();
        let err = NativeBuilder::new(config(Utf8PathBuf::from("/nonexistent/build"), None), &executor)
            .build()
            .expect_err("missing tree must fail");
        assert!(matches!(err, DistError::MissingInput { .. }));
    }
}
