//! Recursive archive expansion into a flat destination directory.
//!
//! Each archive is unpacked into its own staging directory under the scratch
//! root, never into the destination. The staging tree is then walked file by
//! file in name order: nested archives are expanded depth-first into the same
//! destination, everything else is moved to a collision-free name directly in
//! the destination (folder structure inside the archive is flattened).
//!
//! An entry counts as an archive when its extension *contains* `zip`,
//! case-insensitively. `release.gzipbackup` therefore matches too; this is
//! kept on purpose so existing payload producers behave as before.

mod error;
mod place;
mod unpack;

pub use error::ExtractError;

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::checksum;
use crate::collision;
use crate::scratch::{self, ScratchSpace};

/// Default bound on archives nested inside archives.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// What an entry found in staging turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Archive,
    RegularFile,
}

/// One file met during expansion and where it ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionUnit {
    /// Path inside a staging directory (gone once expansion returns).
    pub source: PathBuf,
    pub kind: EntryKind,
    /// Final path in the destination; `None` for archives and for files
    /// dropped because every collision-free name was taken.
    pub destination: Option<PathBuf>,
}

impl ExtractionUnit {
    pub fn is_placed(&self) -> bool {
        self.destination.is_some()
    }
}

/// True if the extension of `path` contains "zip" (ASCII case-insensitive).
pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase().contains("zip"))
        .unwrap_or(false)
}

/// Expands archives through staging directories in a [`ScratchSpace`].
#[derive(Debug, Clone)]
pub struct ArchiveExpander {
    scratch: ScratchSpace,
    max_depth: usize,
}

impl ArchiveExpander {
    pub fn new(scratch: ScratchSpace, max_depth: usize) -> Self {
        Self { scratch, max_depth }
    }

    /// Expand `archive` into `destination`, creating `destination` if absent.
    ///
    /// Returns one unit per file found, in processing order. Staging
    /// directories are removed on every exit path; files already moved into
    /// `destination` stay there when a later entry fails.
    pub fn expand(
        &self,
        archive: &Path,
        destination: &Path,
    ) -> Result<Vec<ExtractionUnit>, ExtractError> {
        let mut ancestors = HashSet::new();
        let mut units = Vec::new();
        self.expand_level(archive, destination, 0, &mut ancestors, &mut units)?;

        let placed = units.iter().filter(|u| u.is_placed()).count();
        let dropped = units
            .iter()
            .filter(|u| u.kind == EntryKind::RegularFile && !u.is_placed())
            .count();
        tracing::info!(
            archive = %archive.display(),
            destination = %destination.display(),
            placed,
            dropped,
            "archive expanded"
        );
        Ok(units)
    }

    fn expand_level(
        &self,
        archive: &Path,
        destination: &Path,
        depth: usize,
        ancestors: &mut HashSet<String>,
        units: &mut Vec<ExtractionUnit>,
    ) -> Result<(), ExtractError> {
        if depth > self.max_depth {
            return Err(ExtractError::TooDeep {
                path: archive.to_path_buf(),
                limit: self.max_depth,
            });
        }
        // Keyed by content: an archive that contains a copy of one of its own
        // enclosing archives would otherwise unpack forever.
        let digest = checksum::sha256_file(archive)
            .map_err(|e| ExtractError::io("hash", archive, io::Error::new(io::ErrorKind::Other, e)))?;
        if !ancestors.insert(digest.clone()) {
            return Err(ExtractError::Cycle {
                path: archive.to_path_buf(),
            });
        }

        let staging = self
            .scratch
            .staging_dir()
            .map_err(|e| ExtractError::io("create staging directory in", self.scratch.root(), e))?;
        let result =
            self.drain_staging(archive, staging.path(), destination, depth, ancestors, units);
        scratch::discard_staging(staging);
        ancestors.remove(&digest);
        result
    }

    fn drain_staging(
        &self,
        archive: &Path,
        staging: &Path,
        destination: &Path,
        depth: usize,
        ancestors: &mut HashSet<String>,
        units: &mut Vec<ExtractionUnit>,
    ) -> Result<(), ExtractError> {
        let count = unpack::unpack_zip(archive, staging)?;
        tracing::debug!(archive = %archive.display(), depth, files = count, "unpacked into staging");

        fs::create_dir_all(destination)
            .map_err(|e| ExtractError::io("create destination", destination, e))?;

        for entry in WalkDir::new(staging).sort_by_file_name() {
            let entry = entry.map_err(|source| ExtractError::Walk {
                path: staging.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let source = entry.path().to_path_buf();

            if is_archive(&source) {
                self.expand_level(&source, destination, depth + 1, ancestors, units)?;
                units.push(ExtractionUnit {
                    source,
                    kind: EntryKind::Archive,
                    destination: None,
                });
                continue;
            }

            let wanted = destination.join(entry.file_name());
            let placed = match collision::resolve(&wanted) {
                Some(target) => {
                    place::move_file(&source, &target)?;
                    Some(target)
                }
                None => {
                    tracing::debug!(
                        file = %wanted.display(),
                        "all collision-free names taken, dropping file"
                    );
                    None
                }
            };
            units.push(ExtractionUnit {
                source,
                kind: EntryKind::RegularFile,
                destination: placed,
            });
        }
        Ok(())
    }
}
