//! One client-submitted file: transfer validation, metadata derivation, and
//! relocation out of the staging area.
//!
//! An artifact starts pending: declared (client-supplied) metadata is the
//! only name source, and the first move is provenance-checked against the
//! staging area. A successful relocation flips it to relocated, where the
//! filesystem is the source of truth and ordinary moves apply. The flip
//! happens exactly once and is never reversed.

mod error;

pub use error::ArtifactError;

use std::path::{Path, PathBuf};

use crate::metadata;
use crate::name_model;
use crate::staging::StagingArea;
use crate::transfer::{TransferRecord, TransferStatus};

/// Declared MIME fallback when the client supplied none.
const OCTET_STREAM: &str = "application/octet-stream";

/// One file submitted by a client during a form submission.
#[derive(Debug)]
pub struct UploadArtifact {
    staging: StagingArea,
    stored_path: PathBuf,
    declared_name: String,
    declared_mime_type: String,
    declared_size: Option<u64>,
    status: TransferStatus,
    relocated: bool,
}

impl UploadArtifact {
    /// Builds a pending artifact from an ingestion record.
    ///
    /// Fails with `UploadsDisabled` when `staging` refuses uploads, and
    /// with `SourceNotFound` when the record's stored path is not an
    /// existing regular file. On success the stored path is canonical and
    /// the declared name reduced to a safe base component.
    pub fn from_record(
        staging: &StagingArea,
        record: TransferRecord,
    ) -> Result<Self, ArtifactError> {
        Self::build(staging, record, false)
    }

    /// Builds an artifact for content already under application control,
    /// e.g. re-opened after an earlier relocation. Ordinary moves apply
    /// from the start; declared metadata is no longer preferred.
    pub fn already_relocated(
        staging: &StagingArea,
        record: TransferRecord,
    ) -> Result<Self, ArtifactError> {
        Self::build(staging, record, true)
    }

    fn build(
        staging: &StagingArea,
        record: TransferRecord,
        relocated: bool,
    ) -> Result<Self, ArtifactError> {
        if !staging.uploads_enabled() {
            return Err(ArtifactError::UploadsDisabled);
        }
        let stored_path = metadata::real_path(&record.stored_path).map_err(|_| {
            ArtifactError::SourceNotFound {
                path: record.stored_path.clone(),
            }
        })?;
        Ok(Self {
            staging: staging.clone(),
            stored_path,
            declared_name: name_model::derive_stored_name(&record.declared_name),
            declared_mime_type: record
                .declared_mime_type
                .unwrap_or_else(|| OCTET_STREAM.to_string()),
            declared_size: record.declared_size,
            status: record.status,
            relocated,
        })
    }

    /// Current location of the content. Canonical and absolute.
    pub fn stored_path(&self) -> &Path {
        &self.stored_path
    }

    /// Safe base component of the client-declared filename.
    pub fn declared_name(&self) -> &str {
        &self.declared_name
    }

    /// Client-declared MIME type; `application/octet-stream` when absent.
    pub fn declared_mime_type(&self) -> &str {
        &self.declared_mime_type
    }

    /// Client-declared byte size, if any.
    pub fn declared_size(&self) -> Option<u64> {
        self.declared_size
    }

    pub fn transfer_status(&self) -> TransferStatus {
        self.status
    }

    /// True iff the transfer completed successfully. Callers check this
    /// before treating the stored content as meaningful; metadata accessors
    /// work either way.
    pub fn is_successful(&self) -> bool {
        self.status.is_success()
    }

    /// True once the content has left the staging area.
    pub fn is_relocated(&self) -> bool {
        self.relocated
    }

    /// MIME type introspected from the stored path when determinable, else
    /// the declared type. Pending artifacts sit on extension-less `.part`
    /// paths, so introspection only starts winning once relocation gives
    /// the content a real name.
    pub fn effective_mime_type(&self) -> &str {
        metadata::mime_type_of(&self.stored_path).unwrap_or(&self.declared_mime_type)
    }

    /// Declared size when present, else the on-disk length. The declared
    /// value is a best-effort hint from a possibly interrupted transfer;
    /// the filesystem is authoritative when consulted.
    pub fn effective_size(&self) -> std::io::Result<u64> {
        match self.declared_size {
            Some(n) => Ok(n),
            None => metadata::size_of(&self.stored_path),
        }
    }

    /// File extension with its leading dot, case preserved; `None` when
    /// underivable.
    ///
    /// Pending artifacts derive it from the declared name (the staged path
    /// carries no meaningful extension); relocated artifacts derive it from
    /// the stored path.
    pub fn extension(&self) -> Option<String> {
        let ext = if self.relocated {
            metadata::extension_of(&self.stored_path)
        } else {
            metadata::extension_of(Path::new(&self.declared_name))
        };
        ext.map(|e| format!(".{e}"))
    }

    /// Moves the content into `destination_dir`, under `new_name` (reduced
    /// to its safe base component) when given, else the artifact's declared
    /// name.
    ///
    /// The first move is provenance-checked: it succeeds only when the
    /// source is still a pending transfer inside the staging area. Later
    /// moves are ordinary renames. On success the stored path becomes the
    /// canonical destination and the artifact is marked relocated; on
    /// failure nothing changes and the call may be retried.
    pub fn relocate(
        &mut self,
        destination_dir: &Path,
        new_name: Option<&str>,
    ) -> Result<(), ArtifactError> {
        let name = match new_name {
            Some(n) => name_model::derive_stored_name(n),
            None => self.declared_name.clone(),
        };
        let target = destination_dir.join(&name);

        let moved = if self.relocated {
            self.staging.move_file(&self.stored_path, &target)
        } else {
            self.staging.move_staged(&self.stored_path, &target)
        };
        if let Err(source) = moved {
            return Err(ArtifactError::Relocation {
                from: self.stored_path.clone(),
                to: target,
                source,
            });
        }

        tracing::debug!(
            "relocated {} to {}",
            self.stored_path.display(),
            target.display()
        );
        self.stored_path = std::fs::canonicalize(&target).unwrap_or(target);
        self.relocated = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UsmConfig;

    fn area() -> (tempfile::TempDir, StagingArea) {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::open_at(dir.path()).unwrap();
        (dir, staging)
    }

    fn staged_file(staging: &StagingArea, name: &str, contents: &[u8]) -> PathBuf {
        let path = staging.root().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn construction_canonicalizes_and_keeps_metadata() {
        let (_dir, staging) = area();
        let src = staged_file(&staging, "transfer-1.part", b"hello");
        let mut rec = TransferRecord::new(src, "photo.JPG");
        rec.declared_mime_type = Some("image/jpeg".to_string());
        rec.declared_size = Some(5);

        let artifact = UploadArtifact::from_record(&staging, rec).unwrap();
        assert!(artifact.stored_path().is_absolute());
        assert_eq!(artifact.declared_name(), "photo.JPG");
        assert_eq!(artifact.declared_mime_type(), "image/jpeg");
        assert!(!artifact.is_relocated());
        assert!(artifact.is_successful());
    }

    #[test]
    fn effective_size_prefers_declared_then_disk() {
        let (_dir, staging) = area();
        let src = staged_file(&staging, "a.part", b"12345678");

        let mut rec = TransferRecord::new(src.clone(), "a.bin");
        rec.declared_size = Some(4096);
        let declared = UploadArtifact::from_record(&staging, rec).unwrap();
        assert_eq!(declared.effective_size().unwrap(), 4096);

        let real = UploadArtifact::from_record(&staging, TransferRecord::new(src, "a.bin")).unwrap();
        assert_eq!(real.effective_size().unwrap(), 8);
    }

    #[test]
    fn missing_source_is_source_not_found() {
        let (_dir, staging) = area();
        let rec = TransferRecord::new(staging.root().join("absent.part"), "x.txt");
        match UploadArtifact::from_record(&staging, rec) {
            Err(ArtifactError::SourceNotFound { path }) => {
                assert!(path.ends_with("absent.part"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn disabled_uploads_refuse_construction() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = UsmConfig {
            uploads_enabled: false,
            staging_dir: Some(dir.path().to_path_buf()),
            max_upload_bytes: None,
        };
        let staging = StagingArea::open(&cfg).unwrap();
        let src = staged_file(&staging, "t.part", b"x");
        match UploadArtifact::from_record(&staging, TransferRecord::new(src, "x.txt")) {
            Err(ArtifactError::UploadsDisabled) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn traversal_in_declared_name_reduces_to_base() {
        let (_dir, staging) = area();
        let src = staged_file(&staging, "t.part", b"x");
        let artifact =
            UploadArtifact::from_record(&staging, TransferRecord::new(src, "../../etc/passwd"))
                .unwrap();
        assert_eq!(artifact.declared_name(), "passwd");
    }

    #[test]
    fn pending_extension_comes_from_declared_name() {
        let (_dir, staging) = area();
        let src = staged_file(&staging, "transfer-9.part", b"not actually a jpeg");
        let artifact =
            UploadArtifact::from_record(&staging, TransferRecord::new(src, "photo.JPG")).unwrap();
        assert_eq!(artifact.extension().as_deref(), Some(".JPG"));
    }

    #[test]
    fn pending_extension_none_when_underivable() {
        let (_dir, staging) = area();
        let src = staged_file(&staging, "t.part", b"x");
        let artifact =
            UploadArtifact::from_record(&staging, TransferRecord::new(src, "README")).unwrap();
        assert_eq!(artifact.extension(), None);
    }

    #[test]
    fn relocated_extension_comes_from_destination() {
        let (_dir, staging) = area();
        let src = staged_file(&staging, "t.part", b"x");
        let mut artifact =
            UploadArtifact::from_record(&staging, TransferRecord::new(src, "notes.txt")).unwrap();

        let dest = tempfile::tempdir().unwrap();
        artifact.relocate(dest.path(), Some("report.pdf")).unwrap();
        assert_eq!(artifact.extension().as_deref(), Some(".pdf"));
    }

    #[test]
    fn effective_mime_switches_to_filesystem_after_relocation() {
        let (_dir, staging) = area();
        let src = staged_file(&staging, "t.part", b"x");
        let mut rec = TransferRecord::new(src, "data.dat");
        rec.declared_mime_type = Some("text/plain".to_string());
        let mut artifact = UploadArtifact::from_record(&staging, rec).unwrap();

        // Staged `.part` path introspects to nothing; declared wins.
        assert_eq!(artifact.effective_mime_type(), "text/plain");

        let dest = tempfile::tempdir().unwrap();
        artifact.relocate(dest.path(), Some("image.png")).unwrap();
        assert_eq!(artifact.effective_mime_type(), "image/png");
    }

    #[test]
    fn relocate_twice_moves_twice_leaving_no_stragglers() {
        let (_dir, staging) = area();
        let src = staged_file(&staging, "t.part", b"payload");
        let mut artifact =
            UploadArtifact::from_record(&staging, TransferRecord::new(src.clone(), "doc.txt"))
                .unwrap();

        let first = tempfile::tempdir().unwrap();
        artifact.relocate(first.path(), None).unwrap();
        assert!(artifact.is_relocated());
        assert!(!src.exists());
        let first_path = first.path().join("doc.txt");
        assert!(first_path.exists());

        let second = tempfile::tempdir().unwrap();
        artifact.relocate(second.path(), Some("final.txt")).unwrap();
        assert!(!first_path.exists());
        let second_path = second.path().join("final.txt");
        assert_eq!(std::fs::read(&second_path).unwrap(), b"payload");
        assert!(artifact.stored_path().ends_with("final.txt"));
    }

    #[test]
    fn relocate_failure_leaves_state_unchanged() {
        let (_dir, staging) = area();
        let src = staged_file(&staging, "t.part", b"x");
        let mut artifact =
            UploadArtifact::from_record(&staging, TransferRecord::new(src, "doc.txt")).unwrap();
        let before = artifact.stored_path().to_path_buf();

        let missing = tempfile::tempdir().unwrap();
        let gone = missing.path().join("no/such/dir");
        match artifact.relocate(&gone, None) {
            Err(ArtifactError::Relocation { from, .. }) => assert_eq!(from, before),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(artifact.stored_path(), before);
        assert!(!artifact.is_relocated());

        // State stayed valid; retrying elsewhere succeeds.
        let dest = tempfile::tempdir().unwrap();
        artifact.relocate(dest.path(), None).unwrap();
        assert!(artifact.is_relocated());
    }

    #[test]
    fn relocate_refuses_sources_outside_staging() {
        let (_dir, staging) = area();
        let other = tempfile::tempdir().unwrap();
        let outside = other.path().join("victim.bin");
        std::fs::write(&outside, b"secret").unwrap();

        // Construction only checks existence; the provenance check bites at
        // the first move.
        let mut artifact =
            UploadArtifact::from_record(&staging, TransferRecord::new(outside.clone(), "x.bin"))
                .unwrap();
        let dest = tempfile::tempdir().unwrap();
        match artifact.relocate(dest.path(), None) {
            Err(ArtifactError::Relocation { source, .. }) => {
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidInput);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(outside.exists());
        assert!(!artifact.is_relocated());
    }

    #[test]
    fn failed_transfer_is_data_not_error() {
        let (_dir, staging) = area();
        let src = staged_file(&staging, "t.part", b"half");
        let mut rec = TransferRecord::new(src, "big.iso");
        rec.status = TransferStatus::PartialTransfer;
        let artifact = UploadArtifact::from_record(&staging, rec).unwrap();

        assert!(!artifact.is_successful());
        assert_eq!(artifact.transfer_status(), TransferStatus::PartialTransfer);
        // Metadata access is independent of transfer success.
        assert_eq!(artifact.effective_size().unwrap(), 4);
        assert_eq!(artifact.effective_mime_type(), "application/octet-stream");
        assert_eq!(artifact.extension().as_deref(), Some(".iso"));
    }

    #[test]
    fn relocate_sanitizes_caller_supplied_name() {
        let (_dir, staging) = area();
        let src = staged_file(&staging, "t.part", b"x");
        let mut artifact =
            UploadArtifact::from_record(&staging, TransferRecord::new(src, "a.txt")).unwrap();

        let dest = tempfile::tempdir().unwrap();
        artifact
            .relocate(dest.path(), Some("../escape.txt"))
            .unwrap();
        assert!(dest.path().join("escape.txt").exists());
        assert!(!dest.path().parent().unwrap().join("escape.txt").exists());
    }

    #[test]
    fn already_relocated_uses_ordinary_move() {
        let (_dir, staging) = area();
        let other = tempfile::tempdir().unwrap();
        let owned = other.path().join("owned.txt");
        std::fs::write(&owned, b"mine").unwrap();

        let mut artifact =
            UploadArtifact::already_relocated(&staging, TransferRecord::new(owned, "owned.txt"))
                .unwrap();
        assert!(artifact.is_relocated());

        let dest = tempfile::tempdir().unwrap();
        artifact.relocate(dest.path(), None).unwrap();
        assert_eq!(
            std::fs::read(dest.path().join("owned.txt")).unwrap(),
            b"mine"
        );
    }
}
