//! Scratch storage: the downloaded archive and per-archive staging directories.
//!
//! Everything created here is scoped. Dropping a [`ScratchFile`] or a staging
//! [`TempDir`] removes it; the explicit `discard`/`close` paths exist so that
//! a failed removal can be logged instead of silently ignored. Removal errors
//! never become the outcome of a run.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempDir};

const SCRATCH_PREFIX: &str = ".adl-";

/// Root directory for scratch files of all runs in this process.
#[derive(Debug, Clone)]
pub struct ScratchSpace {
    root: PathBuf,
}

impl ScratchSpace {
    /// `root = None` uses the system temp directory.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root: root.unwrap_or_else(std::env::temp_dir),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_root(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// Fresh, empty file for one download.
    pub fn download_file(&self) -> io::Result<ScratchFile> {
        self.ensure_root()?;
        let file = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .suffix(".download")
            .tempfile_in(&self.root)?;
        tracing::debug!(path = %file.path().display(), "created scratch download file");
        Ok(ScratchFile { file })
    }

    /// Fresh, uniquely named staging directory for unpacking one archive.
    pub fn staging_dir(&self) -> io::Result<TempDir> {
        self.ensure_root()?;
        tempfile::Builder::new()
            .prefix(".adl-staging-")
            .tempdir_in(&self.root)
    }
}

/// Downloaded archive in scratch storage. Deleted on drop.
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn as_file_mut(&mut self) -> &mut File {
        self.file.as_file_mut()
    }

    /// Flush file data to disk before the archive is read back.
    pub fn sync(&self) -> io::Result<()> {
        self.file.as_file().sync_all()
    }

    /// Remove the file now, logging (not returning) a failure.
    pub fn discard(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            tracing::warn!(path = %path.display(), "failed to remove scratch file: {}", e);
        }
    }
}

/// Remove a staging directory now, logging (not returning) a failure.
pub fn discard_staging(dir: TempDir) {
    let path = dir.path().to_path_buf();
    if let Err(e) = dir.close() {
        tracing::warn!(path = %path.display(), "failed to remove staging directory: {}", e);
    }
}
