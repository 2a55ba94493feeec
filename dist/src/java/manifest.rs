//! JAR manifest rendering.
//!
//! A manifest is an ordered list of `Name: value` attributes. The JAR
//! format requires CRLF line endings, lines of at most 72 bytes, and
//! continuation lines that start with a single space.

use std::fmt;
use thiserror::Error;

/// Maximum line length in bytes, excluding the line terminator.
pub const MAX_LINE_BYTES: usize = 72;

const LINE_END: &str = "\r\n";

/// Errors raised while building a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    /// The attribute name is empty, too long or uses disallowed characters.
    #[error("invalid manifest attribute name `{0}`")]
    InvalidName(String),

    /// The attribute value contains a line break or NUL.
    #[error("manifest attribute `{name}` has a value with a control character")]
    InvalidValue {
        /// The attribute whose value was rejected.
        name: String,
    },

    /// The attribute was added twice.
    #[error("manifest attribute `{0}` is already set")]
    Duplicate(String),
}

/// An ordered set of main-section manifest attributes.
///
/// `Manifest-Version: 1.0` is always written first.
///
/// # Examples
///
/// ```
/// use jetbeep_dist::java::manifest::JarManifest;
///
/// let manifest = JarManifest::new()
///     .with("Main-Class", "example.Main")
///     .expect("valid attribute");
/// assert_eq!(
///     manifest.render(),
///     "Manifest-Version: 1.0\r\nMain-Class: example.Main\r\n\r\n"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JarManifest {
    attributes: Vec<(String, String)>,
}

impl JarManifest {
    /// An empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The manifest carried by the binding library JAR.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::InvalidValue`] if either value contains a
    /// control character.
    pub fn implementation(title: &str, version: &str) -> Result<Self, ManifestError> {
        Self::new()
            .with("Implementation-Title", title)?
            .with("Implementation-Version", version)
    }

    /// Add an attribute.
    ///
    /// # Errors
    ///
    /// Returns a [`ManifestError`] for invalid names, invalid values and
    /// repeated names (compared case-insensitively, as the JAR format does).
    pub fn with(mut self, name: &str, value: &str) -> Result<Self, ManifestError> {
        validate_name(name)?;
        if value.chars().any(|ch| matches!(ch, '\r' | '\n' | '\0')) {
            return Err(ManifestError::InvalidValue {
                name: name.to_owned(),
            });
        }
        let taken = name.eq_ignore_ascii_case("Manifest-Version")
            || self
                .attributes
                .iter()
                .any(|(existing, _)| existing.eq_ignore_ascii_case(name));
        if taken {
            return Err(ManifestError::Duplicate(name.to_owned()));
        }
        self.attributes.push((name.to_owned(), value.to_owned()));
        Ok(self)
    }

    /// Look up an attribute value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Render the manifest, including the terminating blank line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        push_wrapped(&mut out, "Manifest-Version: 1.0");
        for (name, value) in &self.attributes {
            push_wrapped(&mut out, &format!("{name}: {value}"));
        }
        out.push_str(LINE_END);
        out
    }
}

impl fmt::Display for JarManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn validate_name(name: &str) -> Result<(), ManifestError> {
    let valid = !name.is_empty()
        && name.len() <= 70
        && name
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_');
    if valid {
        Ok(())
    } else {
        Err(ManifestError::InvalidName(name.to_owned()))
    }
}

/// Append `line`, split into 72-byte physical lines.
///
/// Splits never fall inside a multi-byte character.
fn push_wrapped(out: &mut String, line: &str) {
    let mut rest = line;
    let mut limit = MAX_LINE_BYTES;
    loop {
        if rest.len() <= limit {
            out.push_str(rest);
            out.push_str(LINE_END);
            return;
        }
        let mut cut = limit;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        let (head, tail) = rest.split_at(cut);
        out.push_str(head);
        out.push_str(LINE_END);
        out.push(' ');
        rest = tail;
        // Continuation lines spend one byte on the leading space.
        limit = MAX_LINE_BYTES - 1;
    }
}
