//! JAR writing.

use super::manifest::JarManifest;
use crate::discover::{entry_name, files_under};
use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use log::trace;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Path of the manifest inside a JAR.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Entry options shared by every zip-based archive this crate writes.
///
/// Timestamps are pinned to the zip epoch so identical inputs produce
/// identical bytes.
#[must_use]
pub fn entry_options(mode: u32) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(mode)
}

/// Contents of a JAR: a manifest plus named files.
#[derive(Debug, Clone)]
pub struct JarContents {
    manifest: JarManifest,
    entries: BTreeMap<String, Utf8PathBuf>,
}

impl JarContents {
    /// Start a JAR with `manifest`.
    #[must_use]
    pub fn new(manifest: JarManifest) -> Self {
        Self {
            manifest,
            entries: BTreeMap::new(),
        }
    }

    /// Add every file below `root`, named by its path relative to `root`.
    ///
    /// Returns the number of files added.
    ///
    /// # Errors
    ///
    /// Propagates discovery errors.
    pub fn add_tree(&mut self, root: &Utf8Path) -> Result<usize> {
        let files = files_under(root)?;
        let count = files.len();
        for file in files {
            if let Some(name) = entry_name(root, &file) {
                self.entries.insert(name, file);
            }
        }
        Ok(count)
    }

    /// Entry names in write order, manifest first.
    #[must_use]
    pub fn entry_names(&self) -> Vec<&str> {
        std::iter::once(MANIFEST_PATH)
            .chain(self.entries.keys().map(String::as_str))
            .collect()
    }

    /// Write the JAR to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns I/O or zip errors.
    pub fn write_to(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = BufWriter::new(File::create(path)?);
        let mut writer = self.write(file)?;
        writer.flush()?;
        trace!("wrote {} entries to {path}", self.entries.len() + 1);
        Ok(())
    }

    fn write<W: Write + Seek>(&self, sink: W) -> Result<W> {
        let mut zip = ZipWriter::new(sink);
        zip.start_file(MANIFEST_PATH, entry_options(0o644))?;
        zip.write_all(self.manifest.render().as_bytes())?;

        for (name, source) in &self.entries {
            zip.start_file(name.as_str(), entry_options(0o644))?;
            let mut input = File::open(source)?;
            io::copy(&mut input, &mut zip)?;
        }
        Ok(zip.finish()?)
    }
}
