//! File-metadata collaborator: canonical paths, sizes, extensions, MIME.
//!
//! Artifact accessors consult this module whenever the filesystem is the
//! preferred source of truth (always for sizes, after relocation for names).

mod mime;

pub use mime::mime_for_extension;

use std::io;
use std::path::{Path, PathBuf};

/// Canonical absolute path of an existing regular file.
///
/// Fails when the path does not resolve, and with `InvalidInput` when it
/// resolves to something other than a regular file (directory, socket, ...).
pub fn real_path(path: &Path) -> io::Result<PathBuf> {
    let canonical = std::fs::canonicalize(path)?;
    let meta = std::fs::metadata(&canonical)?;
    if !meta.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a regular file: {}", canonical.display()),
        ));
    }
    Ok(canonical)
}

/// On-disk byte length.
pub fn size_of(path: &Path) -> io::Result<u64> {
    Ok(std::fs::metadata(path)?.len())
}

/// Extension of the final path component, without the dot. Case preserved;
/// `None` for dotless names and dotfiles.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_string())
}

/// MIME type introspected from the path's extension, when it is a known one.
pub fn mime_type_of(path: &Path) -> Option<&'static str> {
    extension_of(path).and_then(|e| mime_for_extension(&e))
}
