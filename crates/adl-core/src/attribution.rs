//! Attribution artifact written beside the extracted files.
//!
//! One file per successful run, named after the payload (`Chair.credit.txt`
//! or `Chair.credit.json`) and uniquified so it never replaces an extracted
//! file. The text layout is:
//!
//! ```text
//! Url: https://example.com/chair
//! Creator: someone
//! License: CC-BY-4.0
//! Assets: chair.mtl, chair.obj
//! SHA-256: 3f2a…
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::AttributionFormat;
use crate::destination::{self, sanitize_component_within, NAME_MAX, SUFFIX_RESERVE};
use crate::payload::Payload;

/// Provenance of one run's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributionRecord {
    pub title: String,
    pub source_url: Option<String>,
    pub creator_name: Option<String>,
    pub license: Option<String>,
    /// Files produced by the run, relative to the destination, `/`-separated, sorted.
    pub files: Vec<String>,
    /// SHA-256 of the downloaded archive, if it could be computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_sha256: Option<String>,
}

impl AttributionRecord {
    pub fn from_payload(payload: &Payload, files: Vec<String>, archive_sha256: Option<String>) -> Self {
        Self {
            title: payload.name.clone(),
            source_url: payload.source_url.clone(),
            creator_name: payload.creator_name.clone(),
            license: payload.license.clone(),
            files,
            archive_sha256,
        }
    }

    /// Plain-text rendering; absent fields are left empty.
    pub fn render_text(&self) -> String {
        let mut out = format!(
            "Url: {}\nCreator: {}\nLicense: {}\nAssets: {}",
            self.source_url.as_deref().unwrap_or(""),
            self.creator_name.as_deref().unwrap_or(""),
            self.license.as_deref().unwrap_or(""),
            self.files.join(", ")
        );
        if let Some(digest) = &self.archive_sha256 {
            out.push_str("\nSHA-256: ");
            out.push_str(digest);
        }
        out.push('\n');
        out
    }
}

/// Files currently under `dir`, relative and sorted. Directories are not listed.
pub fn list_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .with_context(|| format!("strip prefix {} from {}", dir.display(), entry.path().display()))?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        files.push(parts.join("/"));
    }
    files.sort();
    Ok(files)
}

/// Writes `record` into `dir` and returns the artifact path.
///
/// The file is created with `create_new`, so even a name taken between
/// resolution and write is never overwritten.
pub fn write(dir: &Path, record: &AttributionRecord, format: AttributionFormat) -> Result<PathBuf> {
    let (ext, body) = match format {
        AttributionFormat::Text => ("txt", record.render_text()),
        AttributionFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(record).context("serialize attribution record")?;
            json.push('\n');
            ("json", json)
        }
    };
    let suffix = format!(".credit.{}", ext);
    let title =
        sanitize_component_within(&record.title, NAME_MAX - SUFFIX_RESERVE - suffix.len());
    let wanted = dir.join(format!("{}{}", title, suffix));
    let path = destination::unique_path(&wanted);

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .with_context(|| format!("create attribution file {}", path.display()))?;
    file.write_all(body.as_bytes())
        .with_context(|| format!("write attribution file {}", path.display()))?;
    file.sync_all()
        .with_context(|| format!("sync attribution file {}", path.display()))?;

    tracing::debug!(path = %path.display(), files = record.files.len(), "attribution written");
    Ok(path)
}
