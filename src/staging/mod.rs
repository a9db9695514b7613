//! Staging area for pending upload transfers.
//!
//! Pending transfers land as `transfer-*.part` files inside a designated
//! staging root. Content leaves the area through one of two atomic move
//! primitives: `move_staged` verifies transfer provenance first, `move_file`
//! is the ordinary move for content already under application control. Both
//! rename in place and fail without leaving a partial file at the
//! destination.

mod intake;

pub use intake::{IntakeError, IntakeWriter, StagedContent};

use anyhow::{Context, Result};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::UsmConfig;

/// Suffix for staged pending-transfer files.
pub const STAGED_SUFFIX: &str = ".part";

/// The designated transfer-staging directory plus the process-wide upload
/// switches that gate it.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
    uploads_enabled: bool,
    max_upload_bytes: Option<u64>,
}

impl StagingArea {
    /// Opens the staging area described by `cfg`: the configured directory,
    /// or `staging/` under the XDG state dir when unset. Creates the
    /// directory if needed.
    pub fn open(cfg: &UsmConfig) -> Result<Self> {
        let root = match &cfg.staging_dir {
            Some(dir) => dir.clone(),
            None => {
                let xdg_dirs = xdg::BaseDirectories::with_prefix("usm")?;
                xdg_dirs.get_state_home().join("staging")
            }
        };
        Self::open_with(root, cfg.uploads_enabled, cfg.max_upload_bytes)
    }

    /// Opens a staging area directly at `root`, uploads enabled, no byte
    /// cap. For embedding and tests.
    pub fn open_at(root: &Path) -> Result<Self> {
        Self::open_with(root.to_path_buf(), true, None)
    }

    fn open_with(
        root: PathBuf,
        uploads_enabled: bool,
        max_upload_bytes: Option<u64>,
    ) -> Result<Self> {
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create staging dir: {}", root.display()))?;
        let root = std::fs::canonicalize(&root)
            .with_context(|| format!("failed to canonicalize staging dir: {}", root.display()))?;
        tracing::debug!("staging area ready at {}", root.display());
        Ok(Self {
            root,
            uploads_enabled,
            max_upload_bytes,
        })
    }

    /// Canonical staging root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Process-wide switch: false refuses every new artifact and intake.
    pub fn uploads_enabled(&self) -> bool {
        self.uploads_enabled
    }

    /// Byte cap enforced by `IntakeWriter`, if any.
    pub fn max_upload_bytes(&self) -> Option<u64> {
        self.max_upload_bytes
    }

    /// True when `path` resolves to a location inside the staging root.
    pub fn contains(&self, path: &Path) -> bool {
        std::fs::canonicalize(path)
            .map(|p| p.starts_with(&self.root))
            .unwrap_or(false)
    }

    /// Provenance-checked move: relocates `src` to `dest` only when `src`
    /// is a genuine pending transfer — an existing regular file inside the
    /// staging root. A crafted record naming an arbitrary file as its
    /// staged source is refused here, before anything moves.
    pub fn move_staged(&self, src: &Path, dest: &Path) -> io::Result<()> {
        let canonical = std::fs::canonicalize(src)?;
        if !canonical.starts_with(&self.root) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not inside the staging area", src.display()),
            ));
        }
        if !std::fs::metadata(&canonical)?.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", src.display()),
            ));
        }
        std::fs::rename(&canonical, dest)?;
        tracing::debug!(
            "claimed staged transfer {} -> {}",
            canonical.display(),
            dest.display()
        );
        Ok(())
    }

    /// Ordinary move for content already under application control.
    /// Atomic-or-fail; fails if `dest` is on a different filesystem.
    pub fn move_file(&self, src: &Path, dest: &Path) -> io::Result<()> {
        std::fs::rename(src, dest)
    }
}
