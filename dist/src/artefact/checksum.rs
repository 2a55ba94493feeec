//! SHA-256 checksum sidecars for distribution archives.

use super::assembly::publish_mode;
use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Read, Write};

/// Compute the lowercase hex SHA-256 digest of a file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read.
pub fn sha256_file(path: &Utf8Path) -> Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Path of the sidecar for `archive`.
#[must_use]
pub fn sidecar_path(archive: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{archive}.sha256"))
}

/// Write `<hex>  <file name>` next to `archive`, in `sha256sum` format.
///
/// Returns the digest.
///
/// # Errors
///
/// Returns an I/O error if hashing or writing fails.
pub fn write_sidecar(archive: &Utf8Path) -> Result<String> {
    let digest = sha256_file(archive)?;
    let name = archive.file_name().unwrap_or(archive.as_str());
    let mut sidecar = fs::File::create(sidecar_path(archive))?;
    writeln!(sidecar, "{digest}  {name}")?;
    publish_mode(&sidecar)?;
    Ok(digest)
}
