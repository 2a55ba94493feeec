//! Start scripts for the example application.
//!
//! The distribution ships a POSIX shell script and a Windows batch file under
//! `bin/`. Both locate the installation directory relative to themselves,
//! put every JAR in `lib/` on the classpath and start the main class. The
//! placeholder `{app_home}` in a JVM argument expands to that directory.

/// Placeholder expanded to the installation directory.
pub const APP_HOME_PLACEHOLDER: &str = "{app_home}";

/// Inputs for the start scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherSpec {
    /// Script name, also the application name.
    pub name: String,
    /// Fully-qualified main class.
    pub main_class: String,
    /// JVM arguments, possibly containing [`APP_HOME_PLACEHOLDER`].
    pub jvm_args: Vec<String>,
    /// JAR file names under `lib/`, in classpath order.
    pub jars: Vec<String>,
}

impl LauncherSpec {
    /// The POSIX shell launcher, stored as `bin/<name>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use jetbeep_dist::launcher::LauncherSpec;
    ///
    /// let spec = LauncherSpec {
    ///     name: "example".to_owned(),
    ///     main_class: "example.Main".to_owned(),
    ///     jvm_args: vec!["-Djava.library.path={app_home}/libjetbeep-jni".to_owned()],
    ///     jars: vec!["example-1.0.jar".to_owned()],
    /// };
    /// let script = spec.unix_script();
    /// assert!(script.starts_with("#!/bin/sh\n"));
    /// assert!(script.contains("\"-Djava.library.path=$APP_HOME/libjetbeep-jni\""));
    /// ```
    #[must_use]
    pub fn unix_script(&self) -> String {
        let classpath = self
            .jars
            .iter()
            .map(|jar| format!("$APP_HOME/lib/{}", escape_sh(jar)))
            .collect::<Vec<_>>()
            .join(":");
        let jvm_args = self
            .jvm_args
            .iter()
            .map(|arg| format!(" \"{}\"", expand(arg, "$APP_HOME", escape_sh)))
            .collect::<String>();

        let lines = [
            "#!/bin/sh".to_owned(),
            format!("# Start script for {}", self.name),
            String::new(),
            "APP_HOME=$(cd \"$(dirname \"$0\")/..\" && pwd -P) || exit 1".to_owned(),
            format!("CLASSPATH=\"{classpath}\""),
            String::new(),
            "if [ -n \"$JAVA_HOME\" ]; then".to_owned(),
            "    JAVACMD=\"$JAVA_HOME/bin/java\"".to_owned(),
            "else".to_owned(),
            "    JAVACMD=java".to_owned(),
            "fi".to_owned(),
            String::new(),
            format!(
                "exec \"$JAVACMD\"{jvm_args} $JAVA_OPTS -classpath \"$CLASSPATH\" {} \"$@\"",
                self.main_class
            ),
        ];
        let mut script = lines.join("\n");
        script.push('\n');
        script
    }

    /// The Windows batch launcher, stored as `bin/<name>.bat`.
    #[must_use]
    pub fn windows_script(&self) -> String {
        let classpath = self
            .jars
            .iter()
            .map(|jar| format!("%APP_HOME%\\lib\\{}", escape_bat(jar)))
            .collect::<Vec<_>>()
            .join(";");
        let jvm_args = self
            .jvm_args
            .iter()
            .map(|arg| format!(" \"{}\"", expand(arg, "%APP_HOME%", escape_bat)))
            .collect::<String>();

        let lines = [
            "@echo off".to_owned(),
            format!("rem Start script for {}", self.name),
            "setlocal".to_owned(),
            String::new(),
            "set \"APP_HOME=%~dp0..\"".to_owned(),
            format!("set \"CLASSPATH={classpath}\""),
            String::new(),
            "set \"JAVACMD=java.exe\"".to_owned(),
            "if not defined JAVA_HOME goto execute".to_owned(),
            "set \"JAVACMD=%JAVA_HOME%\\bin\\java.exe\"".to_owned(),
            String::new(),
            ":execute".to_owned(),
            format!(
                "\"%JAVACMD%\"{jvm_args} %JAVA_OPTS% -classpath \"%CLASSPATH%\" {} %*",
                self.main_class
            ),
            "exit /b %ERRORLEVEL%".to_owned(),
        ];
        let mut script = lines.join("\r\n");
        script.push_str("\r\n");
        script
    }
}

/// Escape each literal piece of `arg` and join the pieces with `home`.
fn expand(arg: &str, home: &str, escape: fn(&str) -> String) -> String {
    arg.split(APP_HOME_PLACEHOLDER)
        .map(escape)
        .collect::<Vec<_>>()
        .join(home)
}

/// Escape text for a double-quoted POSIX shell word.
fn escape_sh(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Escape text for a double-quoted batch argument.
fn escape_bat(text: &str) -> String {
    text.replace('%', "%%").replace('"', "\"\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn spec() -> LauncherSpec {
        LauncherSpec {
            name: "example".to_owned(),
            main_class: "example.Main".to_owned(),
            jvm_args: vec!["-Djava.library.path={app_home}/libjetbeep-jni".to_owned()],
            jars: vec![
                "example-0.1.0-alpha.jar".to_owned(),
                "libjetbeep-jni-java-0.1.0-alpha.jar".to_owned(),
            ],
        }
    }

    #[rstest]
    fn unix_script_builds_classpath_in_order(spec: LauncherSpec) {
        let script = spec.unix_script();
        assert!(script.contains(concat!(
            "CLASSPATH=\"$APP_HOME/lib/example-0.1.0-alpha.jar:",
            "$APP_HOME/lib/libjetbeep-jni-java-0.1.0-alpha.jar\""
        )));
        assert!(script.contains("-classpath \"$CLASSPATH\" example.Main \"$@\""));
        assert!(!script.contains('\r'));
    }

    #[rstest]
    fn windows_script_uses_crlf_and_expands_home(spec: LauncherSpec) {
        let script = spec.windows_script();
        assert!(script.contains("\"-Djava.library.path=%APP_HOME%/libjetbeep-jni\""));
        assert!(script.contains("%APP_HOME%\\lib\\example-0.1.0-alpha.jar;"));
        assert!(script.ends_with("exit /b %ERRORLEVEL%\r\n"));
        assert_eq!(script.matches("\r\n").count(), script.matches('\n').count());
    }

    #[rstest]
    #[case::dollar("-Dprice=$5", "\"-Dprice=\\$5\"")]
    #[case::quote("-Dname=\"x\"", "\"-Dname=\\\"x\\\"\"")]
    #[case::home_twice("{app_home}:{app_home}", "\"$APP_HOME:$APP_HOME\"")]
    fn unix_arguments_are_quoted(mut spec: LauncherSpec, #[case] arg: &str, #[case] quoted: &str) {
        spec.jvm_args = vec![arg.to_owned()];
        assert!(spec.unix_script().contains(&format!("exec \"$JAVACMD\" {quoted} ")));
    }

    #[rstest]
    fn java_home_is_never_expanded_inside_a_block(spec: LauncherSpec) {
        let script = spec.windows_script();
        let mut depth = 0_usize;
        for line in script.lines() {
            if line.contains("%JAVA_HOME%") {
                assert_eq!(depth, 0, "`{line}` expands JAVA_HOME inside ( ... )");
                assert!(line.starts_with("set \""), "`{line}` must quote the assignment");
            }
            depth = (depth + line.matches('(').count()).saturating_sub(line.matches(')').count());
        }
        assert!(script.contains("if not defined JAVA_HOME goto execute\r\n"));
        assert!(script.contains(":execute\r\n\"%JAVACMD%\""));
    }

    #[rstest]
    fn batch_percent_signs_are_doubled(mut spec: LauncherSpec) {
        spec.jvm_args = vec!["-Dratio=50%".to_owned()];
        assert!(spec.windows_script().contains("\"-Dratio=50%%\""));
    }
}
