//! Declared-name modeling and safe stored-name derivation.
//!
//! Client-declared filenames are untrusted: they may carry directory
//! traversal segments, control characters, or reserved names. This module
//! reduces them to a single safe base component for use in destination
//! paths.

mod base;
mod sanitize;

pub use base::base_component;
pub use sanitize::sanitize_upload_name;

/// Fallback name when the declared filename yields nothing usable.
const DEFAULT_NAME: &str = "upload.bin";

/// Derives the name an upload is stored and relocated under.
///
/// Base component of the declared name, sanitized for the local filesystem;
/// falls back to `upload.bin` when nothing usable remains.
///
/// # Examples
///
/// - `derive_stored_name("photo.JPG")` → `"photo.JPG"`
/// - `derive_stored_name("../../etc/passwd")` → `"passwd"`
/// - `derive_stored_name("..")` → `"upload.bin"`
pub fn derive_stored_name(declared: &str) -> String {
    let sanitized = sanitize_upload_name(base_component(declared));
    if sanitized.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        sanitized
    }
}
