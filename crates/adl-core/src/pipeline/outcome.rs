//! Terminal outcome of a pipeline run.

use std::fmt;
use std::path::PathBuf;

/// Exactly one of these is produced per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Files are in `destination`; `primary_artifact` is the first model file
    /// found there, or `destination` itself when there is none.
    Succeeded {
        destination: PathBuf,
        primary_artifact: PathBuf,
    },
    /// An entry already existed at the logical destination and the run was declined.
    Skipped { existing: PathBuf },
    /// Transport failure; nothing was written to the destination.
    DownloadFailed(String),
    /// The archive (or a nested one) could not be expanded.
    ExtractFailed(String),
    /// Files were placed but the attribution artifact could not be written.
    AttributionFailed { destination: PathBuf, reason: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded { .. })
    }

    /// Final destination, when the run got far enough to have one.
    pub fn destination(&self) -> Option<&PathBuf> {
        match self {
            Outcome::Succeeded { destination, .. }
            | Outcome::AttributionFailed { destination, .. } => Some(destination),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Succeeded { destination, .. } => {
                write!(f, "downloaded into {}", destination.display())
            }
            Outcome::Skipped { existing } => {
                write!(f, "skipped: {} already exists", existing.display())
            }
            Outcome::DownloadFailed(reason) => write!(f, "download failed: {}", reason),
            Outcome::ExtractFailed(reason) => write!(f, "extraction failed: {}", reason),
            Outcome::AttributionFailed {
                destination,
                reason,
            } => write!(
                f,
                "files placed in {} but attribution failed: {}",
                destination.display(),
                reason
            ),
        }
    }
}
