//! Streaming intake of one upload field into the staging area.
//!
//! The request-ingestion layer feeds decoded body chunks through an
//! `IntakeWriter`; the writer lands them in a unique `.part` file, keeps a
//! running SHA-256, and enforces the configured byte cap. The finished file
//! is the pending transfer that `UploadArtifact` later claims.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use super::{StagingArea, STAGED_SUFFIX};
use crate::transfer::TransferStatus;

/// Result of a finished intake: where the bytes landed and what they hash to.
#[derive(Debug, Clone)]
pub struct StagedContent {
    pub path: PathBuf,
    pub len: u64,
    /// Lowercase hex SHA-256 of the staged bytes.
    pub sha256: String,
}

/// Error while writing staged bytes, classified so the ingestion layer can
/// record the matching transfer status instead of failing the whole request.
#[derive(Debug)]
pub enum IntakeError {
    /// The transfer grew past the configured staging byte cap.
    LimitExceeded { limit: u64, attempted: u64 },
    /// Disk write failed (disk full, permission denied, ...). Not retried.
    Storage(std::io::Error),
}

impl IntakeError {
    /// Transfer status the ingestion layer should report for this failure.
    pub fn transfer_status(&self) -> TransferStatus {
        match self {
            IntakeError::LimitExceeded { .. } => TransferStatus::ExceedsSizeLimit,
            IntakeError::Storage(_) => TransferStatus::WriteFailure,
        }
    }
}

impl fmt::Display for IntakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntakeError::LimitExceeded { limit, attempted } => {
                write!(f, "transfer of {} bytes exceeds the {} byte cap", attempted, limit)
            }
            IntakeError::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

impl std::error::Error for IntakeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IntakeError::Storage(e) => Some(e),
            IntakeError::LimitExceeded { .. } => None,
        }
    }
}

/// Writer for one pending transfer. Append-only; single writer per field.
pub struct IntakeWriter {
    file: File,
    path: PathBuf,
    hasher: Sha256,
    written: u64,
    limit: Option<u64>,
}

impl IntakeWriter {
    /// Allocates a unique `transfer-*.part` file in the staging root.
    ///
    /// Refuses when uploads are disabled. The file persists after the
    /// writer is dropped; call `discard` to abandon a partial transfer.
    pub fn create_in(staging: &StagingArea) -> Result<Self> {
        anyhow::ensure!(
            staging.uploads_enabled(),
            "uploads are disabled by configuration"
        );
        let (file, path) = tempfile::Builder::new()
            .prefix("transfer-")
            .suffix(STAGED_SUFFIX)
            .tempfile_in(staging.root())
            .with_context(|| {
                format!("failed to allocate staged file in {}", staging.root().display())
            })?
            .keep()
            .context("failed to persist staged file")?;
        Ok(Self {
            file,
            path,
            hasher: Sha256::new(),
            written: 0,
            limit: staging.max_upload_bytes(),
        })
    }

    /// Reserve space ahead of writes when the declared size is known. On
    /// Unix tries `posix_fallocate` for real block allocation, falling back
    /// to `set_len`.
    pub fn preallocate(&mut self, size: u64) -> Result<()> {
        #[cfg(unix)]
        {
            let fd = self.file.as_raw_fd();
            let r = unsafe { libc::posix_fallocate(fd, 0, size as libc::off_t) };
            if r == 0 {
                return Ok(());
            }
            tracing::debug!(errno = r, "posix_fallocate failed, falling back to set_len");
        }
        self.file
            .set_len(size)
            .context("failed to preallocate staged file")?;
        Ok(())
    }

    /// Appends `data` and updates the running digest. Fails with
    /// `LimitExceeded` once the transfer grows past the byte cap; the
    /// partial file stays on disk for `discard`.
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<(), IntakeError> {
        let attempted = self.written + data.len() as u64;
        if let Some(limit) = self.limit {
            if attempted > limit {
                return Err(IntakeError::LimitExceeded { limit, attempted });
            }
        }
        self.file.write_all(data).map_err(IntakeError::Storage)?;
        self.hasher.update(data);
        self.written = attempted;
        Ok(())
    }

    /// Bytes accepted so far.
    pub fn len(&self) -> u64 {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Path of the pending transfer file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Syncs and closes the staged file, returning its location, length,
    /// and content digest.
    pub fn finish(self) -> Result<StagedContent, IntakeError> {
        // Drop any preallocated tail the transfer never filled.
        self.file.set_len(self.written).map_err(IntakeError::Storage)?;
        self.file.sync_all().map_err(IntakeError::Storage)?;
        let digest = self.hasher.finalize();
        Ok(StagedContent {
            path: self.path,
            len: self.written,
            sha256: hex::encode(digest),
        })
    }

    /// Abandons the transfer and removes the partial file. Best effort.
    pub fn discard(self) {
        drop(self.file);
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::debug!(
                "failed to remove abandoned transfer {}: {}",
                self.path.display(),
                e
            );
        }
    }
}
