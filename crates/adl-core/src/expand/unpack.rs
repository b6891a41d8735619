//! Unpack one zip archive into a staging directory.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use super::error::ExtractError;

/// Extracts every entry of `archive` below `staging`, keeping the archive's
/// folder layout. Entries whose names would land outside `staging` (absolute
/// paths, `..`) are skipped. Returns the number of files written.
pub(super) fn unpack_zip(archive: &Path, staging: &Path) -> Result<usize, ExtractError> {
    let file = File::open(archive).map_err(|source| ExtractError::Open {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = zip::ZipArchive::new(file).map_err(|source| ExtractError::Zip {
        path: archive.to_path_buf(),
        source,
    })?;

    let mut written = 0;
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|source| ExtractError::Zip {
            path: archive.to_path_buf(),
            source,
        })?;

        let relative = match entry.enclosed_name() {
            Some(p) => p,
            None => {
                tracing::warn!(
                    archive = %archive.display(),
                    entry = entry.name(),
                    "skipping zip entry with unsafe path"
                );
                continue;
            }
        };
        let out_path = staging.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .map_err(|e| ExtractError::io("create directory", &out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ExtractError::io("create directory", parent, e))?;
        }
        let mut out = File::create(&out_path)
            .map_err(|e| ExtractError::io("create file", &out_path, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| ExtractError::io("extract", &out_path, e))?;
        written += 1;
    }

    Ok(written)
}
