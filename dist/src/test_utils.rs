//! Shared test utilities for the distribution builder.
//!
//! Available to unit tests and, through the `test-support` feature, to the
//! behaviour suites under `tests/`.

use crate::error::{DistError, Result};
use crate::exec::{CommandExecutor, CommandSpec};
use camino::{Utf8Path, Utf8PathBuf};
use jetbeep_build::{BuildSettings, Project};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::process::{ExitStatus, Output};
use tempfile::TempDir;

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    Output {
        status: exit_status(0),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Side effect a stubbed tool performs before "exiting", such as writing
/// the file a real compiler would have produced.
pub type StubEffect = fn(&CommandSpec);

/// An expected command invocation.
pub struct ExpectedCall {
    /// The program name (e.g. "cmake").
    pub program: String,
    /// The arguments the program must receive.
    pub args: Vec<String>,
    /// The result returned for this invocation.
    pub result: Result<Output>,
    /// Optional side effect run when the call matches.
    pub effect: Option<StubEffect>,
}

impl ExpectedCall {
    /// Expect `program` with `args` and answer with a successful exit.
    #[must_use]
    pub fn succeeds(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_owned(),
            args: args.iter().map(|&arg| arg.to_owned()).collect(),
            result: Ok(success_output()),
            effect: None,
        }
    }

    /// Expect `program` with `args` and answer with exit code 1.
    #[must_use]
    pub fn fails(program: &str, args: &[&str], stderr: &str) -> Self {
        Self {
            result: Ok(failure_output(stderr)),
            ..Self::succeeds(program, args)
        }
    }

    /// Attach a side effect to this call.
    #[must_use]
    pub fn with_effect(mut self, effect: StubEffect) -> Self {
        self.effect = Some(effect);
        self
    }
}

impl std::fmt::Debug for ExpectedCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpectedCall")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("result", &self.result)
            .field("effect", &self.effect.is_some())
            .finish()
    }
}

/// Matches calls whose arguments are not known up front (for example a
/// compiler invocation listing generated temp paths) by program name only.
pub const ANY_ARGS: &str = "<any>";

/// A scripted implementation of [`CommandExecutor`].
///
/// Calls are matched in order. A call that does not match the next
/// expectation yields [`DistError::StubMismatch`].
#[derive(Debug, Default)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
    seen: RefCell<Vec<CommandSpec>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            seen: RefCell::new(Vec::new()),
        }
    }

    /// Every command received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.seen.borrow().clone()
    }

    /// Programs received so far, in order.
    #[must_use]
    pub fn programs(&self) -> Vec<String> {
        self.seen
            .borrow()
            .iter()
            .map(|spec| spec.program().to_owned())
            .collect()
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        let remaining = self.expected.borrow();
        assert!(
            remaining.is_empty(),
            "expected no further command invocations, {} remain (next: {:?})",
            remaining.len(),
            remaining.front().map(|call| &call.program)
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, spec: &CommandSpec) -> Result<Output> {
        self.seen.borrow_mut().push(spec.clone());
        let call = self
            .expected
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| DistError::StubMismatch {
                message: format!("unexpected invocation `{spec}`"),
            })?;

        let args_match = call.args.first().is_some_and(|arg| arg == ANY_ARGS)
            || call.args.as_slice() == spec.arg_list();
        if call.program != spec.program() || !args_match {
            return Err(DistError::StubMismatch {
                message: format!(
                    "expected `{} {}`, got `{spec}`",
                    call.program,
                    call.args.join(" ")
                ),
            });
        }

        if let Some(effect) = call.effect {
            effect(spec);
        }
        call.result
    }
}

/// Write `contents` to `path`, creating parent directories.
///
/// # Panics
///
/// Panics on I/O failure.
pub fn write_file(path: &Utf8Path, contents: impl AsRef<[u8]>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(path, contents).expect("write file");
}

/// Stub effect for `javac`: drops a class file into the `-d` directory.
///
/// # Panics
///
/// Panics if the command has no `-d` argument.
pub fn fake_javac(spec: &CommandSpec) {
    let out = Utf8Path::new(spec.value_after("-d").expect("javac receives -d"));
    write_file(&out.join("com/jetbeep/Stub.class"), b"\xca\xfe\xba\xbe");
}

/// Stub effect for `javadoc`: writes an index page into the `-d` directory.
///
/// # Panics
///
/// Panics if the command has no `-d` argument.
pub fn fake_javadoc(spec: &CommandSpec) {
    let out = Utf8Path::new(spec.value_after("-d").expect("javadoc receives -d"));
    write_file(&out.join("index.html"), "<html></html>");
}

/// Stub effect for `mdpdf`: writes `README.pdf` in the working directory.
///
/// # Panics
///
/// Panics if the command has no working directory.
pub fn fake_mdpdf(spec: &CommandSpec) {
    let dir = spec.cwd().expect("mdpdf runs in the README directory");
    write_file(&dir.join("README.pdf"), b"%PDF-1.4");
}

/// Arguments of the default native build invocation.
pub const CMAKE_ARGS: [&str; 4] = ["--build", ".", "--target", "jetbeep-jni"];

/// A throwaway jetbeep JNI checkout with sources, a README and a native
/// output directory, configured through `jetbeep-build.toml`.
#[derive(Debug)]
pub struct ProjectFixture {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl ProjectFixture {
    /// Settings written by [`ProjectFixture::new`].
    pub const SETTINGS: &'static str = concat!(
        "[project]\n",
        "version = \"0.1.0-alpha\"\n",
        "\n",
        "[native]\n",
        "build_dir = \"cmake-build\"\n",
    );

    /// Create the fixture with one Linux native library.
    ///
    /// # Panics
    ///
    /// Panics on I/O failure.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(Self::SETTINGS)
    }

    /// Create the fixture with custom settings text.
    ///
    /// # Panics
    ///
    /// Panics on I/O failure.
    #[must_use]
    pub fn with_settings(settings: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
        let fixture = Self { _dir: dir, root };

        fixture.write(jetbeep_build::config::DEFAULT_SETTINGS_FILE, settings);
        fs::create_dir_all(fixture.path("cmake-build")).expect("build tree");
        fixture.write(
            "libjetbeep-jni-java/src/main/java/com/jetbeep/Device.java",
            "package com.jetbeep; public class Device {}\n",
        );
        fixture.write(
            "example/src/main/java/example/Main.java",
            "package example; public class Main {}\n",
        );
        fixture.write("example/README.md", "# jetbeep example\n");
        fixture.write("libjetbeep-jni/libjetbeep-jni.so", b"\x7fELF");
        fixture
    }

    /// The checkout root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Absolute path of `relative`.
    #[must_use]
    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }

    /// The settings file.
    #[must_use]
    pub fn settings_path(&self) -> Utf8PathBuf {
        self.path(jetbeep_build::config::DEFAULT_SETTINGS_FILE)
    }

    /// Write a file relative to the root.
    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) {
        write_file(&self.path(relative), contents);
    }

    /// Load the project without consulting the process environment.
    ///
    /// # Panics
    ///
    /// Panics if the settings are invalid.
    #[must_use]
    pub fn project(&self) -> Project {
        let settings = BuildSettings::read(&self.settings_path()).expect("valid settings");
        Project::from_settings(self.root.clone(), settings).expect("version resolves")
    }

    /// Expected calls for a full build, in execution order.
    #[must_use]
    pub fn full_build_calls(mdpdf: &str) -> Vec<ExpectedCall> {
        vec![
            ExpectedCall::succeeds("cmake", &CMAKE_ARGS),
            ExpectedCall::succeeds("javac", &[ANY_ARGS]).with_effect(fake_javac),
            ExpectedCall::succeeds("javadoc", &[ANY_ARGS]).with_effect(fake_javadoc),
            ExpectedCall::succeeds("javac", &[ANY_ARGS]).with_effect(fake_javac),
            ExpectedCall::succeeds(mdpdf, &["README.md"]).with_effect(fake_mdpdf),
        ]
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}
