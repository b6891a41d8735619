//! SHA-256 of a downloaded archive, recorded in the attribution artifact.
//!
//! Computed once after the transfer, off the network path. This is a
//! provenance note, not an authenticity check.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;

/// Compute SHA-256 of a file and return it as lowercase hex.
/// Streams the file through the hasher, so memory use does not grow with file size.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).with_context(|| format!("read {}", path.display()))?;
    Ok(hex::encode(hasher.finalize()))
}
