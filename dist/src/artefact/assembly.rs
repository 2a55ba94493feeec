//! Distribution archive writing.
//!
//! A [`DistributionLayout`] maps archive paths to their sources. Writing is
//! deterministic (sorted entries, pinned timestamps, fixed ownership) and
//! atomic: the archive is built in a temporary file beside the destination
//! and renamed into place only once complete.

use crate::discover::{entry_name, files_under};
use crate::error::{DistError, Result};
use crate::java::jar::entry_options;
use camino::{Utf8Path, Utf8PathBuf};
use flate2::Compression;
use flate2::write::GzEncoder;
use jetbeep_build::ArchiveFormat;
use log::{debug, trace};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, Write};
use tempfile::NamedTempFile;
use zip::ZipWriter;

/// Permissions for ordinary files.
pub const FILE_MODE: u32 = 0o644;

/// Permissions for launcher scripts.
pub const EXEC_MODE: u32 = 0o755;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    File(Utf8PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    source: Source,
    mode: u32,
}

impl Entry {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(match &self.source {
            Source::File(path) => Box::new(File::open(path)?),
            Source::Bytes(bytes) => Box::new(bytes.as_slice()),
        })
    }

    fn size(&self) -> io::Result<u64> {
        match &self.source {
            Source::File(path) => Ok(fs::metadata(path)?.len()),
            Source::Bytes(bytes) => Ok(bytes.len() as u64),
        }
    }
}

/// The files of a distribution archive, keyed by their path inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionLayout {
    root: String,
    entries: BTreeMap<String, Entry>,
}

impl DistributionLayout {
    /// An empty layout whose entries live under `root/`.
    #[must_use]
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            entries: BTreeMap::new(),
        }
    }

    /// The top-level folder name.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Add a file at `path` (relative to the root folder).
    pub fn add_file(&mut self, path: &str, source: &Utf8Path, mode: u32) {
        self.insert(path, Source::File(source.to_owned()), mode);
    }

    /// Add generated content at `path`.
    pub fn add_bytes(&mut self, path: &str, bytes: impl Into<Vec<u8>>, mode: u32) {
        self.insert(path, Source::Bytes(bytes.into()), mode);
    }

    /// Add every file below `dir` under the `prefix` folder.
    ///
    /// Returns the number of files added.
    ///
    /// # Errors
    ///
    /// Returns [`DistError::MissingInput`] if `dir` is not a directory, or a
    /// discovery error.
    pub fn add_tree(&mut self, prefix: &str, dir: &Utf8Path, what: &'static str) -> Result<usize> {
        if !dir.is_dir() {
            return Err(DistError::MissingInput {
                what,
                path: dir.to_owned(),
            });
        }
        let files = files_under(dir)?;
        let count = files.len();
        for file in &files {
            if let Some(name) = entry_name(dir, file) {
                self.add_file(&format!("{prefix}/{name}"), file, FILE_MODE);
            }
        }
        Ok(count)
    }

    fn insert(&mut self, path: &str, source: Source, mode: u32) {
        let key = format!("{}/{}", self.root, path.trim_start_matches('/'));
        if self.entries.insert(key.clone(), Entry { source, mode }).is_some() {
            debug!("{key} added twice; keeping the later source");
        }
    }

    /// Full entry paths in write order.
    #[must_use]
    pub fn entry_names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the layout has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the archive to `destination`.
    ///
    /// Nothing appears at `destination` unless every entry was written.
    ///
    /// # Errors
    ///
    /// Returns I/O or zip errors; the temporary file is removed on failure.
    pub fn write(&self, destination: &Utf8Path, format: ArchiveFormat) -> Result<()> {
        let dir = destination
            .parent()
            .filter(|dir| !dir.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        trace!("staging {destination} in {}", temp.path().display());
        {
            let sink = BufWriter::new(temp.as_file_mut());
            let mut sink = match format {
                ArchiveFormat::Zip => self.write_zip(sink)?,
                ArchiveFormat::TarGz => self.write_tar_gz(sink)?,
            };
            sink.flush()?;
        }
        temp.as_file().sync_all()?;
        publish_mode(temp.as_file())?;
        temp.persist(destination).map_err(|err| err.error)?;
        debug!("wrote {} entries to {destination}", self.entries.len());
        Ok(())
    }

    fn write_zip<W: Write + Seek>(&self, sink: W) -> Result<W> {
        let mut zip = ZipWriter::new(sink);
        for (name, entry) in &self.entries {
            zip.start_file(name.as_str(), entry_options(entry.mode))?;
            io::copy(&mut entry.open()?, &mut zip)?;
        }
        Ok(zip.finish()?)
    }

    fn write_tar_gz<W: Write>(&self, sink: W) -> Result<W> {
        let encoder = GzEncoder::new(sink, Compression::default());
        let mut tar = tar::Builder::new(encoder);
        for (name, entry) in &self.entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(entry.size()?);
            header.set_mode(entry.mode);
            header.set_mtime(0);
            header.set_uid(0);
            header.set_gid(0);
            header.set_entry_type(tar::EntryType::Regular);
            tar.append_data(&mut header, name, entry.open()?)?;
        }
        Ok(tar.into_inner()?.finish()?)
    }
}

/// Give a published file [`FILE_MODE`]; staged temporary files start
/// owner-only.
#[cfg(unix)]
pub(crate) fn publish_mode(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(FILE_MODE))
}

#[cfg(not(unix))]
pub(crate) fn publish_mode(_file: &File) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[path = "assembly_tests.rs"]
mod tests;
