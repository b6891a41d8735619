use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::outcome::Outcome;
use super::primary;
use super::progress::{Phase, Reporter};
use super::{RunPlan, Settings};
use crate::attribution::{self, AttributionRecord};
use crate::checksum;
use crate::expand::ArchiveExpander;
use crate::fetch;
use crate::payload::Payload;
use crate::scratch::ScratchFile;

pub(super) async fn execute(plan: RunPlan, reporter: Reporter) -> Outcome {
    let RunPlan {
        settings,
        payload,
        request,
    } = plan;
    let destination = request.concrete().to_path_buf();

    if let Err(e) = payload.validate() {
        tracing::warn!(name = %payload.name, "rejected payload: {}", e);
        return Outcome::DownloadFailed(e.to_string());
    }
    tracing::info!(
        name = %payload.name,
        url = %payload.download_url,
        destination = %destination.display(),
        "run started"
    );

    let mut scratch_file = match settings.scratch.download_file() {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(root = %settings.scratch.root().display(), "scratch unavailable: {}", e);
            return Outcome::DownloadFailed(format!("cannot create scratch file: {e}"));
        }
    };
    reporter.report(Phase::Fetching, 0);

    let url = payload.download_url.trim().to_string();
    let fetched = tokio::task::spawn_blocking({
        let url = url.clone();
        let transport = settings.transport.clone();
        let reporter = reporter.clone();
        move || {
            let result = fetch::download_to(
                &url,
                scratch_file.as_file_mut(),
                &transport,
                reporter.fetch_callback(),
            );
            (scratch_file, result)
        }
    })
    .await;

    let (scratch_file, result) = match fetched {
        Ok(pair) => pair,
        Err(e) => return Outcome::DownloadFailed(format!("download task failed: {e}")),
    };
    let bytes = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            scratch_file.discard();
            tracing::warn!(url = %url, "download failed: {}", e);
            return Outcome::DownloadFailed(format!("GET {url} failed: {e}"));
        }
    };
    tracing::info!(url = %url, bytes, "archive downloaded");
    reporter.report(Phase::Processing, bytes);

    let processed =
        tokio::task::spawn_blocking(move || process(&settings, &payload, scratch_file, destination))
            .await;
    match processed {
        Ok(outcome) => outcome,
        Err(e) => Outcome::ExtractFailed(format!("processing task failed: {e}")),
    }
}

/// Checksum, expand, attribute. Blocking.
fn process(
    settings: &Settings,
    payload: &Payload,
    scratch_file: ScratchFile,
    destination: PathBuf,
) -> Outcome {
    if let Err(e) = scratch_file.sync() {
        tracing::warn!(path = %scratch_file.path().display(), "sync failed: {}", e);
    }
    let digest = match checksum::sha256_file(scratch_file.path()) {
        Ok(digest) => Some(digest),
        Err(e) => {
            tracing::warn!("archive checksum unavailable: {:#}", e);
            None
        }
    };

    let expander = ArchiveExpander::new(settings.scratch.clone(), settings.max_nesting_depth);
    let expanded = expander.expand(scratch_file.path(), &destination);
    scratch_file.discard();
    if let Err(e) = expanded {
        remove_if_empty(&destination);
        tracing::warn!(destination = %destination.display(), "extraction failed: {}", e);
        return Outcome::ExtractFailed(e.to_string());
    }

    attribute(destination, payload, digest, |dir, record| {
        attribution::write(dir, record, settings.attribution_format)
    })
}

/// List the placed files, write the attribution artifact with `write`, pick
/// the primary artifact. Placed files are kept when writing fails.
fn attribute<W>(
    destination: PathBuf,
    payload: &Payload,
    digest: Option<String>,
    write: W,
) -> Outcome
where
    W: FnOnce(&Path, &AttributionRecord) -> anyhow::Result<PathBuf>,
{
    let files = match attribution::list_files(&destination) {
        Ok(files) => files,
        Err(e) => {
            return Outcome::AttributionFailed {
                destination,
                reason: format!("{e:#}"),
            }
        }
    };
    let record = AttributionRecord::from_payload(payload, files, digest);
    if let Err(e) = write(&destination, &record) {
        tracing::warn!(destination = %destination.display(), "attribution failed: {:#}", e);
        return Outcome::AttributionFailed {
            destination,
            reason: format!("{e:#}"),
        };
    }

    let primary_artifact = primary::primary_artifact(&destination, &record.files);
    tracing::info!(
        destination = %destination.display(),
        primary = %primary_artifact.display(),
        files = record.files.len(),
        "run succeeded"
    );
    Outcome::Succeeded {
        destination,
        primary_artifact,
    }
}

/// A destination left empty by a failed extraction is removed; partial output stays.
fn remove_if_empty(destination: &Path) {
    match fs::remove_dir(destination) {
        Ok(()) => tracing::debug!(path = %destination.display(), "removed empty destination"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::debug!(path = %destination.display(), "destination kept: {}", e),
    }
}
