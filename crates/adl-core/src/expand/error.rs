//! Extraction error type.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal failure while expanding an archive tree. Aborts the run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("cannot open archive {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot read zip archive {}: {source}", .path.display())]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("{operation} {}: {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot walk staging directory {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("archive nesting deeper than {limit} levels at {}", .path.display())]
    TooDeep { path: PathBuf, limit: usize },
    #[error("archive {} contains a copy of an enclosing archive", .path.display())]
    Cycle { path: PathBuf },
}

impl ExtractError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        ExtractError::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
