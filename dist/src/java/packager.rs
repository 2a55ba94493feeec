//! Compilation and packaging of the Java binding module and the example
//! application.

use super::jar::JarContents;
use super::manifest::JarManifest;
use crate::discover::files_matching;
use crate::error::{DistError, Result};
use crate::exec::{CommandExecutor, CommandSpec, run_step};
use camino::{Utf8Path, Utf8PathBuf};
use jetbeep_build::Project;
use log::{debug, info};
use serde::Serialize;
use std::env::consts::EXE_SUFFIX;
use std::fs;

/// Label for `javac` failures.
pub const COMPILE_STEP: &str = "Java compilation";

/// Label for `javadoc` failures.
pub const JAVADOC_STEP: &str = "Javadoc generation";

/// Locations of the JDK tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JdkTools {
    /// The `javac` executable.
    pub javac: String,
    /// The `javadoc` executable.
    pub javadoc: String,
}

impl JdkTools {
    /// Tools found on `PATH`.
    #[must_use]
    pub fn from_path() -> Self {
        Self {
            javac: "javac".to_owned(),
            javadoc: "javadoc".to_owned(),
        }
    }

    /// Tools under `<home>/bin`.
    #[must_use]
    pub fn in_home(home: &Utf8Path) -> Self {
        let bin = home.join("bin");
        Self {
            javac: bin.join(format!("javac{EXE_SUFFIX}")).into_string(),
            javadoc: bin.join(format!("javadoc{EXE_SUFFIX}")).into_string(),
        }
    }

    /// Resolve from the configured JDK, then `java_home`, then `PATH`.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use jetbeep_dist::java::JdkTools;
    ///
    /// let tools = JdkTools::resolve(None, Some("  ".to_owned()));
    /// assert_eq!(tools, JdkTools::from_path());
    /// ```
    #[must_use]
    pub fn resolve(configured: Option<&Utf8Path>, java_home: Option<String>) -> Self {
        if let Some(home) = configured {
            return Self::in_home(home);
        }
        match java_home.filter(|home| !home.trim().is_empty()) {
            Some(home) => Self::in_home(Utf8Path::new(home.trim())),
            None => Self::from_path(),
        }
    }

    /// Resolve using the process's `JAVA_HOME`.
    #[must_use]
    pub fn detect(project: &Project) -> Self {
        let configured = project
            .settings()
            .java
            .jdk_home
            .as_deref()
            .map(|home| project.path(home));
        let tools = Self::resolve(configured.as_deref(), std::env::var("JAVA_HOME").ok());
        debug!("using javac at {} and javadoc at {}", tools.javac, tools.javadoc);
        tools
    }
}

/// Where the Java build steps read and write.
///
/// All paths are derived from settings, so the assembler can locate the
/// outputs of an earlier run without repeating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaLayout {
    module: String,
    module_sources: Utf8PathBuf,
    module_build: Utf8PathBuf,
    example: String,
    example_sources: Utf8PathBuf,
    example_build: Utf8PathBuf,
    main_class: String,
    version: String,
    javadoc: bool,
    sources: bool,
}

impl JavaLayout {
    /// Derive the layout from project settings.
    #[must_use]
    pub fn from_project(project: &Project) -> Self {
        let settings = project.settings();
        Self {
            module: settings.java.module.clone(),
            module_sources: project.path(&settings.java.source_dir),
            module_build: project.path(&settings.java.build_dir),
            example: settings.example.name.clone(),
            example_sources: project.path(&settings.example.source_dir),
            example_build: project.path(&settings.example.build_dir),
            main_class: settings.example.main_class.clone(),
            version: project.version().to_string(),
            javadoc: settings.java.javadoc,
            sources: settings.java.sources,
        }
    }

    /// Binding module name.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Version stamped into JAR names and manifests.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether a Javadoc JAR is produced.
    #[must_use]
    pub fn javadoc_enabled(&self) -> bool {
        self.javadoc
    }

    /// Binding module source root.
    #[must_use]
    pub fn module_sources(&self) -> &Utf8Path {
        &self.module_sources
    }

    /// Binding module compiled classes.
    #[must_use]
    pub fn module_classes(&self) -> Utf8PathBuf {
        self.module_build.join("classes")
    }

    /// Generated documentation root, shipped as `docs/`.
    #[must_use]
    pub fn docs_dir(&self) -> Utf8PathBuf {
        self.module_build.join("docs")
    }

    /// Javadoc HTML output.
    #[must_use]
    pub fn javadoc_dir(&self) -> Utf8PathBuf {
        self.docs_dir().join("javadoc")
    }

    /// The binding library JAR.
    #[must_use]
    pub fn library_jar(&self) -> Utf8PathBuf {
        self.module_jar("")
    }

    /// The Javadoc JAR.
    #[must_use]
    pub fn javadoc_jar(&self) -> Utf8PathBuf {
        self.module_jar("-javadoc")
    }

    /// The sources JAR.
    #[must_use]
    pub fn sources_jar(&self) -> Utf8PathBuf {
        self.module_jar("-sources")
    }

    fn module_jar(&self, classifier: &str) -> Utf8PathBuf {
        self.module_build
            .join("libs")
            .join(format!("{}-{}{classifier}.jar", self.module, self.version))
    }

    /// Example application name.
    #[must_use]
    pub fn example(&self) -> &str {
        &self.example
    }

    /// Example application main class.
    #[must_use]
    pub fn main_class(&self) -> &str {
        &self.main_class
    }

    /// Example source tree, shipped as `src/`.
    #[must_use]
    pub fn example_tree(&self) -> &Utf8Path {
        &self.example_sources
    }

    /// Example Java sources.
    #[must_use]
    pub fn example_java_sources(&self) -> Utf8PathBuf {
        self.example_sources.join("main").join("java")
    }

    /// Example compiled classes.
    #[must_use]
    pub fn example_classes(&self) -> Utf8PathBuf {
        self.example_build.join("classes")
    }

    /// The example application JAR.
    #[must_use]
    pub fn example_jar(&self) -> Utf8PathBuf {
        self.example_build
            .join("libs")
            .join(format!("{}-{}.jar", self.example, self.version))
    }

    /// JARs the example needs at runtime, in classpath order.
    #[must_use]
    pub fn runtime_jars(&self) -> Vec<Utf8PathBuf> {
        vec![self.example_jar(), self.library_jar()]
    }
}

/// Everything the Java step produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JavaArtefacts {
    /// Binding library JAR.
    pub library_jar: Utf8PathBuf,
    /// Javadoc JAR, when enabled.
    pub javadoc_jar: Option<Utf8PathBuf>,
    /// Sources JAR, when enabled.
    pub sources_jar: Option<Utf8PathBuf>,
    /// Example application JAR.
    pub example_jar: Utf8PathBuf,
}

/// Compiles and packages the Java modules.
pub struct JavaPackager<'a> {
    layout: &'a JavaLayout,
    tools: &'a JdkTools,
    executor: &'a dyn CommandExecutor,
}

impl<'a> JavaPackager<'a> {
    /// Create a packager.
    #[must_use]
    pub fn new(
        layout: &'a JavaLayout,
        tools: &'a JdkTools,
        executor: &'a dyn CommandExecutor,
    ) -> Self {
        Self {
            layout,
            tools,
            executor,
        }
    }

    /// Build the binding module, then the example against it.
    ///
    /// # Errors
    ///
    /// Fails on missing sources, tool failures, manifest errors and I/O.
    pub fn package(&self) -> Result<JavaArtefacts> {
        let layout = self.layout;
        let sources = java_sources(layout.module_sources())?;

        info!("compiling {} ({} sources)", layout.module(), sources.len());
        self.compile(layout.module_sources(), &layout.module_classes(), None, &sources)?;

        let manifest = JarManifest::implementation(layout.module(), layout.version())?;
        let mut library = JarContents::new(manifest);
        library.add_tree(&layout.module_classes())?;
        library.write_to(&layout.library_jar())?;

        let javadoc_jar = if layout.javadoc {
            self.javadoc(&sources)?;
            let mut jar = JarContents::new(JarManifest::new());
            jar.add_tree(&layout.javadoc_dir())?;
            jar.write_to(&layout.javadoc_jar())?;
            Some(layout.javadoc_jar())
        } else {
            None
        };

        let sources_jar = if layout.sources {
            let mut jar = JarContents::new(JarManifest::new());
            jar.add_tree(layout.module_sources())?;
            jar.write_to(&layout.sources_jar())?;
            Some(layout.sources_jar())
        } else {
            None
        };

        let example_jar = self.package_example(&layout.library_jar())?;

        Ok(JavaArtefacts {
            library_jar: layout.library_jar(),
            javadoc_jar,
            sources_jar,
            example_jar,
        })
    }

    fn package_example(&self, library_jar: &Utf8Path) -> Result<Utf8PathBuf> {
        let layout = self.layout;
        let source_root = layout.example_java_sources();
        let sources = java_sources(&source_root)?;

        info!("compiling {} ({} sources)", layout.example(), sources.len());
        self.compile(
            &source_root,
            &layout.example_classes(),
            Some(library_jar),
            &sources,
        )?;

        let manifest = JarManifest::new().with("Main-Class", layout.main_class())?;
        let mut jar = JarContents::new(manifest);
        jar.add_tree(&layout.example_classes())?;
        let path = layout.example_jar();
        jar.write_to(&path)?;
        Ok(path)
    }

    fn compile(
        &self,
        source_root: &Utf8Path,
        classes: &Utf8Path,
        classpath: Option<&Utf8Path>,
        sources: &[Utf8PathBuf],
    ) -> Result<()> {
        reset_dir(classes)?;
        let mut spec = CommandSpec::new(&self.tools.javac).args(["-d", classes.as_str()]);
        if let Some(classpath) = classpath {
            spec = spec.args(["-cp", classpath.as_str()]);
        }
        spec = spec
            .args(["-sourcepath", source_root.as_str()])
            .args(sources.iter().map(|path| path.as_str()));
        run_step(self.executor, COMPILE_STEP, &spec)?;
        Ok(())
    }

    fn javadoc(&self, sources: &[Utf8PathBuf]) -> Result<()> {
        let out = self.layout.javadoc_dir();
        reset_dir(&out)?;
        let spec = CommandSpec::new(&self.tools.javadoc)
            .args(["-quiet", "-d", out.as_str()])
            .args(["-sourcepath", self.layout.module_sources().as_str()])
            .args(sources.iter().map(|path| path.as_str()));
        info!("generating Javadoc for {}", self.layout.module());
        run_step(self.executor, JAVADOC_STEP, &spec)?;
        Ok(())
    }
}

fn java_sources(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    if !root.is_dir() {
        return Err(DistError::MissingInput {
            what: "Java source directory",
            path: root.to_owned(),
        });
    }
    let sources = files_matching(root, "**/*.java")?;
    if sources.is_empty() {
        return Err(DistError::NoSources {
            dir: root.to_owned(),
        });
    }
    Ok(sources)
}

fn reset_dir(dir: &Utf8Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

#[cfg(test)]
#[path = "packager_tests.rs"]
mod tests;
