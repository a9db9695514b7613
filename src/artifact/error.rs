//! Error taxonomy for artifact construction and relocation.

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by `UploadArtifact`.
///
/// Transfer failures reported by the client are not in here; they travel as
/// `TransferStatus` data and are checked with `is_successful`.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Uploads are switched off process-wide. Nothing about the staged path
    /// can be trusted, so the artifact is never constructed. Not retried.
    #[error("uploads are disabled by configuration")]
    UploadsDisabled,

    /// The record's stored path does not resolve to an existing regular
    /// file. Construction-time invariant violation, surfaced immediately.
    #[error("staged source not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    /// Moving the content failed. Carries the OS diagnostic; artifact state
    /// is unchanged, so retrying with another destination is safe.
    #[error("failed to relocate {} to {}: {source}", .from.display(), .to.display())]
    Relocation {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
