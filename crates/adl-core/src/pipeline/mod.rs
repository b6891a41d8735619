//! Download pipeline: payload → destination → scratch download → expansion → attribution.
//!
//! A run is prepared synchronously and then started as a tokio task:
//!
//! 1. [`Pipeline::prepare`] composes `<root>/<name>`. If something already
//!    exists there the caller gets [`Prepared::NeedsDecision`] and must
//!    [`PendingDecision::resume`] it; declining ends the run as `Skipped`
//!    before any network activity.
//! 2. [`RunPlan::start`] spawns the run. The transfer and the extraction each
//!    run on a blocking thread; the caller only awaits [`RunHandle::outcome`].
//!
//! Scratch storage is released before the outcome is produced, whatever it is.

mod execute;
mod outcome;
mod primary;
mod progress;

pub use outcome::Outcome;
pub use primary::{is_model, primary_artifact, MODEL_EXTENSIONS};
pub use progress::{Phase, ProgressEvent};

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{AdlConfig, AttributionFormat, TransportConfig};
use crate::destination::{self, DestinationRequest};
use crate::payload::Payload;
use crate::scratch::ScratchSpace;

use self::progress::Reporter;

/// Answer to "an asset already exists at the logical destination".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Download into a new, uniquely named sibling.
    Continue,
    /// Keep the existing entry and stop.
    Abort,
}

#[derive(Debug)]
struct Settings {
    scratch: ScratchSpace,
    transport: TransportConfig,
    max_nesting_depth: usize,
    attribution_format: AttributionFormat,
}

/// Shared, cheap-to-clone pipeline configuration. Runs share nothing else.
#[derive(Debug, Clone)]
pub struct Pipeline {
    settings: Arc<Settings>,
}

/// Result of [`Pipeline::prepare`].
#[derive(Debug)]
pub enum Prepared {
    Ready(RunPlan),
    NeedsDecision(PendingDecision),
}

/// A run paused at the existing-destination decision point.
#[derive(Debug)]
pub struct PendingDecision {
    pipeline: Pipeline,
    payload: Payload,
    existing: std::path::PathBuf,
}

/// A run with its destination resolved, ready to start.
#[derive(Debug)]
pub struct RunPlan {
    settings: Arc<Settings>,
    payload: Payload,
    request: DestinationRequest,
}

/// Handle to a started run; yields its single terminal outcome.
#[derive(Debug)]
pub struct RunHandle {
    handle: JoinHandle<Outcome>,
}

impl Pipeline {
    pub fn new(cfg: &AdlConfig) -> Self {
        Self {
            settings: Arc::new(Settings {
                scratch: ScratchSpace::new(cfg.scratch_dir.clone()),
                transport: cfg.transport(),
                max_nesting_depth: cfg.max_nesting_depth,
                attribution_format: cfg.attribution_format(),
            }),
        }
    }

    /// Compose the logical destination and check whether it is already taken.
    pub fn prepare(&self, payload: Payload, destination_root: &Path) -> Prepared {
        let logical = destination::logical_destination(destination_root, &payload.name);
        if destination::exists(&logical) {
            tracing::info!(path = %logical.display(), "destination already exists, asking");
            return Prepared::NeedsDecision(PendingDecision {
                pipeline: self.clone(),
                payload,
                existing: logical,
            });
        }
        Prepared::Ready(self.plan(payload, logical))
    }

    fn plan(&self, payload: Payload, logical: std::path::PathBuf) -> RunPlan {
        RunPlan {
            settings: Arc::clone(&self.settings),
            payload,
            request: DestinationRequest::resolve(logical),
        }
    }

    /// Prepare, ask `decide` if the destination exists, then run to completion.
    /// Must be called within a tokio runtime.
    pub async fn run<F>(
        &self,
        payload: Payload,
        destination_root: &Path,
        decide: F,
        progress: Option<mpsc::Sender<ProgressEvent>>,
    ) -> Outcome
    where
        F: FnOnce(&Path) -> Decision,
    {
        let plan = match self.prepare(payload, destination_root) {
            Prepared::Ready(plan) => plan,
            Prepared::NeedsDecision(pending) => {
                let decision = decide(pending.existing());
                match pending.resume(decision) {
                    Ok(plan) => plan,
                    Err(skipped) => return skipped,
                }
            }
        };
        plan.start(progress).outcome().await
    }
}

impl PendingDecision {
    /// The entry already at the logical destination.
    pub fn existing(&self) -> &Path {
        &self.existing
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// `Continue` resolves a unique sibling and returns the plan; `Abort`
    /// returns the terminal `Skipped` outcome as the error.
    pub fn resume(self, decision: Decision) -> Result<RunPlan, Outcome> {
        match decision {
            Decision::Continue => Ok(self.pipeline.plan(self.payload, self.existing)),
            Decision::Abort => {
                tracing::info!(path = %self.existing.display(), "run skipped, destination kept");
                Err(Outcome::Skipped {
                    existing: self.existing,
                })
            }
        }
    }
}

impl RunPlan {
    pub fn destination(&self) -> &DestinationRequest {
        &self.request
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Spawn the run on the current tokio runtime. Does not block.
    pub fn start(self, progress: Option<mpsc::Sender<ProgressEvent>>) -> RunHandle {
        let reporter = Reporter::new(progress);
        RunHandle {
            handle: tokio::spawn(execute::execute(self, reporter)),
        }
    }
}

impl RunHandle {
    /// Wait for the terminal outcome.
    pub async fn outcome(self) -> Outcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("pipeline task failed: {}", e);
                Outcome::ExtractFailed(format!("pipeline task failed: {e}"))
            }
        }
    }
}
