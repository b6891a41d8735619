//! Shared run loop for `fetch`, `get` and `watch`: decision, progress, outcome.

use anyhow::{Context, Result};
use adl_core::config::{self, AdlConfig};
use adl_core::payload::Payload;
use adl_core::pipeline::{Decision, Outcome, Phase, Pipeline, Prepared, ProgressEvent};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::mpsc;

use crate::cli::DestinationArgs;

const PROGRESS_INTERVAL_MS: u64 = 500;

/// What to do when the logical destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Prompt `y/N` on stdin.
    Ask,
    Continue,
    Skip,
}

/// Pipeline plus destination root and conflict policy for one CLI invocation.
pub(super) struct Runner {
    pipeline: Pipeline,
    root: PathBuf,
    policy: ConflictPolicy,
}

impl Runner {
    pub(super) fn from_args(dest: &DestinationArgs) -> Result<(Self, AdlConfig)> {
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let root = dest
            .dest
            .clone()
            .unwrap_or_else(|| cfg.destination_root.clone());
        let runner = Self {
            pipeline: Pipeline::new(&cfg),
            root,
            policy: dest.policy(),
        };
        Ok((runner, cfg))
    }

    /// Run one payload to its terminal outcome, printing progress and the result.
    pub(super) async fn run(&self, payload: Payload) -> Result<Outcome> {
        let name = payload.name.clone();
        let plan = match self.pipeline.prepare(payload, &self.root) {
            Prepared::Ready(plan) => plan,
            Prepared::NeedsDecision(pending) => {
                let decision = match self.policy {
                    ConflictPolicy::Continue => Decision::Continue,
                    ConflictPolicy::Skip => Decision::Abort,
                    ConflictPolicy::Ask => ask(pending.existing()).await?,
                };
                match pending.resume(decision) {
                    Ok(plan) => plan,
                    Err(skipped) => {
                        println!("{}: {}", name, skipped);
                        return Ok(skipped);
                    }
                }
            }
        };
        println!("{} -> {}", name, plan.destination().concrete().display());

        let (progress_tx, progress_rx) = mpsc::channel::<ProgressEvent>(16);
        let printer = tokio::spawn(print_progress(progress_rx));
        let outcome = plan.start(Some(progress_tx)).outcome().await;
        let _ = printer.await;

        println!("{}: {}", name, outcome);
        if let Outcome::Succeeded {
            primary_artifact, ..
        } = &outcome
        {
            println!("  primary: {}", primary_artifact.display());
        }
        Ok(outcome)
    }
}

/// Exit status for an outcome: skipped runs are not failures.
pub(super) fn check(outcome: &Outcome) -> Result<()> {
    match outcome {
        Outcome::Succeeded { .. } | Outcome::Skipped { .. } => Ok(()),
        other => anyhow::bail!("{}", other),
    }
}

async fn ask(existing: &Path) -> Result<Decision> {
    let prompt = format!(
        "{} already exists. Download into a new folder next to it? [y/N] ",
        existing.display()
    );
    tokio::task::spawn_blocking(move || -> Result<Decision> {
        let mut stdout = io::stdout();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).context("read answer")?;
        Ok(parse_answer(&line))
    })
    .await
    .context("prompt task failed")?
}

/// Only an explicit yes continues; anything else (including EOF) aborts.
pub(super) fn parse_answer(line: &str) -> Decision {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Decision::Continue,
        _ => Decision::Abort,
    }
}

async fn print_progress(mut rx: mpsc::Receiver<ProgressEvent>) {
    let mut last_print = Instant::now();
    let mut phase = None;
    while let Some(event) = rx.recv().await {
        let now = Instant::now();
        let phase_changed = phase != Some(event.phase);
        if phase_changed
            || now.duration_since(last_print).as_millis() as u64 >= PROGRESS_INTERVAL_MS
        {
            let mib = event.bytes_received as f64 / 1_048_576.0;
            match event.phase {
                Phase::Fetching => print!("\r  fetching  {:.1} MiB  ", mib),
                Phase::Processing => print!("\r  processing ({:.1} MiB archive)  ", mib),
            }
            let _ = io::stdout().flush();
            phase = Some(event.phase);
            last_print = now;
        }
    }
    if phase.is_some() {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_yes_continues() {
        assert_eq!(parse_answer("y\n"), Decision::Continue);
        assert_eq!(parse_answer(" YES \n"), Decision::Continue);
        assert_eq!(parse_answer("\n"), Decision::Abort);
        assert_eq!(parse_answer(""), Decision::Abort);
        assert_eq!(parse_answer("no"), Decision::Abort);
    }

    #[test]
    fn skipped_is_not_an_error() {
        assert!(check(&Outcome::Skipped {
            existing: PathBuf::from("a")
        })
        .is_ok());
        assert!(check(&Outcome::DownloadFailed("HTTP 404".into())).is_err());
    }
}
