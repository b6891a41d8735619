//! Move an extracted file from staging into the destination.

use std::fs;
use std::path::Path;

use super::error::ExtractError;

/// Rename `source` to `target`; when that fails (typically staging and
/// destination on different filesystems) copy and remove the source instead.
pub(super) fn move_file(source: &Path, target: &Path) -> Result<(), ExtractError> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            tracing::debug!(
                source = %source.display(),
                target = %target.display(),
                "rename failed ({}), copying instead",
                rename_err
            );
            fs::copy(source, target).map_err(|e| ExtractError::io("copy to", target, e))?;
            if let Err(e) = fs::remove_file(source) {
                // The staging directory is removed as a whole afterwards.
                tracing::debug!(path = %source.display(), "remove after copy: {}", e);
            }
            Ok(())
        }
    }
}
