//! `adl fetch <payload>` – download the asset described by a payload.

use anyhow::{Context, Result};
use adl_core::payload::Payload;
use std::io::Read;

use super::run::{self, Runner};
use crate::cli::DestinationArgs;

pub async fn run_fetch(arg: &str, dest: &DestinationArgs) -> Result<()> {
    let text = payload_text(arg).await?;
    let payload = Payload::parse(&text).context("invalid payload")?;
    let (runner, _cfg) = Runner::from_args(dest)?;
    let outcome = runner.run(payload).await?;
    run::check(&outcome)
}

/// `-` reads stdin, `@FILE` reads a file, anything else is the payload itself.
async fn payload_text(arg: &str) -> Result<String> {
    if arg == "-" {
        return tokio::task::spawn_blocking(|| -> Result<String> {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("read payload from stdin")?;
            Ok(text)
        })
        .await
        .context("stdin task failed")?;
    }
    if let Some(path) = arg.strip_prefix('@') {
        return std::fs::read_to_string(path)
            .with_context(|| format!("read payload file {}", path));
    }
    Ok(arg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn payload_from_file_or_literal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.txt");
        std::fs::write(&path, "unity-asset-payload::{}").unwrap();
        let arg = format!("@{}", path.display());
        assert_eq!(payload_text(&arg).await.unwrap(), "unity-asset-payload::{}");
        assert_eq!(payload_text("{\"a\":1}").await.unwrap(), "{\"a\":1}");
        assert!(payload_text("@/nonexistent/adl/payload").await.is_err());
    }
}
