//! CLI argument definitions for `jetbeep-dist`.
//!
//! Global flags may appear before or after the subcommand. Flags that map to
//! settings override the values loaded from `jetbeep-build.toml`.

use crate::graph::TaskId;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use jetbeep_build::ArchiveFormat;
use jetbeep_build::config::DEFAULT_SETTINGS_FILE;
use std::num::NonZeroUsize;

/// Build the jetbeep JNI library and assemble its distribution archive.
#[derive(Parser, Debug)]
#[command(name = "jetbeep-dist")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build the jetbeep JNI library and assemble its distribution archive.\n\n",
    "The native library is built with CMake, the Java bindings and the example ",
    "application are packaged as JARs, the example README is converted to PDF, ",
    "and everything is collected into a platform-specific archive named ",
    "<project>-<version>-<os>-<arch>.zip.",
))]
#[command(after_help = concat!(
    "TASKS:\n",
    "  native-build       cmake --build <build_dir> --target jetbeep-jni\n",
    "  java-package       javac, javadoc and JAR packaging\n",
    "  doc-convert        mdpdf README.md (mdpdf.cmd on Windows)\n",
    "  archive-assemble   distribution archive and .sha256 sidecar\n\n",
    "EXAMPLES:\n",
    "  Build everything:\n",
    "    $ jetbeep-dist\n\n",
    "  Build only the native library with 8 jobs:\n",
    "    $ jetbeep-dist native -j 8\n\n",
    "  Show what would run:\n",
    "    $ jetbeep-dist --dry-run\n\n",
    "  Print the archive name for another platform:\n",
    "    $ jetbeep-dist name --os-name \"Mac OS X\" --os-arch aarch64",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub options: GlobalArgs,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run every task (default when no subcommand given).
    Build,
    /// Build the native library.
    Native,
    /// Compile and package the Java JARs.
    Jar,
    /// Convert the example README to PDF.
    Pdf,
    /// Assemble the distribution archive and everything it needs.
    Dist,
    /// Print the execution order without running anything.
    Plan {
        /// Task to plan for [default: every task].
        #[arg(value_name = "TASK")]
        task: Option<TaskId>,
    },
    /// Print the distribution archive file name.
    Name,
}

impl Command {
    /// The task this command runs, with its dependencies.
    ///
    /// `Plan` and `Name` run nothing and return `None`.
    #[must_use]
    pub const fn target(&self) -> Option<TaskId> {
        match self {
            Self::Build | Self::Dist => Some(TaskId::ArchiveAssemble),
            Self::Native => Some(TaskId::NativeBuild),
            Self::Jar => Some(TaskId::JavaPackage),
            Self::Pdf => Some(TaskId::DocConvert),
            Self::Plan { .. } | Self::Name => None,
        }
    }
}

/// Archive format accepted by `--format`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    /// A `.zip` archive.
    Zip,
    /// A gzip-compressed tarball.
    TarGz,
}

impl From<FormatArg> for ArchiveFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Zip => Self::Zip,
            FormatArg::TarGz => Self::TarGz,
        }
    }
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Settings file; relative paths inside it resolve against its directory.
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = DEFAULT_SETTINGS_FILE,
        global = true
    )]
    pub config: Utf8PathBuf,

    /// Parallel jobs for the native build.
    #[arg(short, long, value_name = "N", global = true)]
    pub jobs: Option<NonZeroUsize>,

    /// Override the OS name used in the archive name.
    ///
    /// Detection reports Windows without its release; pass e.g.
    /// `--os-name "Windows 10"` to get `windows_10` in the name.
    #[arg(long, value_name = "NAME", global = true)]
    pub os_name: Option<String>,

    /// Override the architecture used in the archive name.
    #[arg(long, value_name = "ARCH", global = true)]
    pub os_arch: Option<String>,

    /// Distribution archive format.
    #[arg(long, value_enum, value_name = "FORMAT", global = true)]
    pub format: Option<FormatArg>,

    /// Skip README conversion and leave README.pdf out of the archive.
    #[arg(long, global = true)]
    pub skip_pdf: bool,

    /// Show configuration and planned commands without running them.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Print a JSON build report to stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet",
        global = true
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity", global = true)]
    pub quiet: bool,
}

impl Default for GlobalArgs {
    /// Defaults matching an invocation with no flags.
    fn default() -> Self {
        Self {
            config: Utf8PathBuf::from(DEFAULT_SETTINGS_FILE),
            jobs: None,
            os_name: None,
            os_arch: None,
            format: None,
            skip_pdf: false,
            dry_run: false,
            json: false,
            verbosity: 0,
            quiet: false,
        }
    }
}

impl GlobalArgs {
    /// Default `env_logger` filter for the chosen verbosity.
    ///
    /// # Examples
    ///
    /// ```
    /// use jetbeep_dist::cli::GlobalArgs;
    ///
    /// let args = GlobalArgs { verbosity: 2, ..GlobalArgs::default() };
    /// assert_eq!(args.log_filter(), "debug");
    /// ```
    #[must_use]
    pub const fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

impl Cli {
    /// The effective subcommand; no subcommand means [`Command::Build`].
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Build)
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
