//! `adl watch` – download every payload copied to the clipboard until Ctrl-C.

use anyhow::{Context, Result};
use adl_core::trigger::{CommandSource, PayloadWatcher};
use std::time::Duration;
use tokio::sync::mpsc;

use super::run::Runner;
use crate::cli::DestinationArgs;

pub async fn run_watch(dest: &DestinationArgs) -> Result<()> {
    let (runner, cfg) = Runner::from_args(dest)?;
    let clipboard = cfg.clipboard();
    let source = CommandSource::from_config(&clipboard).context("clipboard source")?;

    let (tx, mut rx) = mpsc::channel(8);
    let watcher = PayloadWatcher::start(
        source,
        Duration::from_millis(clipboard.poll_interval_ms),
        tx,
    );
    println!(
        "Watching the clipboard ({}); press Ctrl-C to stop.",
        clipboard.command.join(" ")
    );

    // Runs are sequential: a payload copied mid-run waits for the current one.
    loop {
        tokio::select! {
            received = rx.recv() => {
                let Some(payload) = received else { break };
                match runner.run(payload).await {
                    Ok(outcome) if !outcome.is_success() => {
                        tracing::warn!("clipboard run ended: {}", outcome);
                    }
                    Ok(_) => {}
                    Err(e) => eprintln!("adl error: {:#}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    watcher.stop().await;
    Ok(())
}
