//! External command execution.
//!
//! Every build step shells out to a tool (cmake, javac, javadoc, mdpdf).
//! Steps describe the invocation as a [`CommandSpec`] and hand it to a
//! [`CommandExecutor`], which lets tests substitute a scripted executor for
//! the real process spawner.

use crate::error::{DistError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, trace};
use std::fmt;
use std::io::Read;
use std::process::{Command, ExitStatus, Output, Stdio};
use std::thread;
use std::time::Duration;
use wait_timeout::ChildExt;

/// A fully-described external command.
///
/// # Examples
///
/// ```
/// use jetbeep_dist::exec::CommandSpec;
///
/// let spec = CommandSpec::new("cmake")
///     .args(["--build", ".", "--target", "jetbeep-jni"])
///     .current_dir("../build");
/// assert_eq!(spec.to_string(), "cmake --build . --target jetbeep-jni");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    cwd: Option<Utf8PathBuf>,
}

impl CommandSpec {
    /// Start describing an invocation of `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the command from `dir`.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// The program name or path.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The argument list.
    #[must_use]
    pub fn arg_list(&self) -> &[String] {
        &self.args
    }

    /// The working directory, when one was set.
    #[must_use]
    pub fn cwd(&self) -> Option<&Utf8Path> {
        self.cwd.as_deref()
    }

    /// Return the value following `flag`, if present.
    #[must_use]
    pub fn value_after(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|index| self.args.get(index + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Run the command to completion and return its captured output.
    ///
    /// A non-zero exit is not an error at this level; see [`run_step`].
    ///
    /// # Errors
    ///
    /// Returns [`DistError::Spawn`] when the process cannot be started and
    /// [`DistError::Timeout`] when it exceeds the executor's limit.
    fn run(&self, spec: &CommandSpec) -> Result<Output>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor {
    timeout: Option<Duration>,
}

impl SystemCommandExecutor {
    /// Create an executor that waits indefinitely.
    #[must_use]
    pub const fn new() -> Self {
        Self { timeout: None }
    }

    /// Kill commands that run longer than `timeout`.
    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, spec: &CommandSpec) -> Result<Output> {
        let mut cmd = Command::new(spec.program());
        cmd.args(spec.arg_list())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = spec.cwd() {
            cmd.current_dir(dir.as_std_path());
        }

        debug!("running `{spec}`");
        let mut child = cmd.spawn().map_err(|source| DistError::Spawn {
            command: spec.to_string(),
            source,
        })?;

        // Drain both pipes on helper threads so a chatty tool cannot block
        // on a full pipe while we wait for it.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match self.timeout {
            Some(limit) => match child.wait_timeout(limit)? {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(DistError::Timeout {
                        command: spec.to_string(),
                        seconds: limit.as_secs(),
                    });
                }
            },
            None => child.wait()?,
        };

        let output = Output {
            status,
            stdout: join_drain(stdout),
            stderr: join_drain(stderr),
        };
        trace!(
            "`{spec}` finished with {}; {} bytes stdout, {} bytes stderr",
            describe_status(status),
            output.stdout.len(),
            output.stderr.len()
        );
        Ok(output)
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        // A read error mid-stream only truncates diagnostics.
        let _ = pipe.read_to_end(&mut buffer);
        buffer
    })
}

fn join_drain(handle: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

/// Describe an exit status for error messages.
#[must_use]
pub fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {code}"),
        None => "termination by signal".to_owned(),
    }
}

/// Run a build step's command and fail unless it exits successfully.
///
/// Standard output is logged at debug level so `-v` shows tool chatter.
///
/// # Errors
///
/// Propagates executor errors and returns [`DistError::StepFailed`] on a
/// non-zero exit.
pub fn run_step(
    executor: &dyn CommandExecutor,
    step: &'static str,
    spec: &CommandSpec,
) -> Result<Output> {
    let output = executor.run(spec)?;
    for line in String::from_utf8_lossy(&output.stdout).lines() {
        debug!("[{step}] {line}");
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DistError::StepFailed {
            step,
            command: spec.to_string(),
            status: describe_status(output.status),
            stderr: stderr.trim().to_owned(),
        });
    }

    Ok(output)
}
