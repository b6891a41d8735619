//! `adl checksum` – SHA-256 of a local file, the same digest the attribution
//! artifact records for a downloaded archive.

use adl_core::checksum::sha256_file;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Print `SHA-256 (<path>) = <hex>`. With `expected`, fail unless the digest matches.
pub async fn run_checksum(path: &Path, expected: Option<&str>) -> Result<()> {
    let digest = digest_of(path.to_path_buf()).await?;
    println!("SHA-256 ({}) = {}", path.display(), digest);
    if let Some(expected) = expected {
        check(&digest, expected)?;
        println!("OK");
    }
    Ok(())
}

async fn digest_of(path: PathBuf) -> Result<String> {
    tokio::task::spawn_blocking(move || sha256_file(&path))
        .await
        .context("checksum task failed")?
}

fn check(actual: &str, expected: &str) -> Result<()> {
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        bail!("digest mismatch: expected {}, got {}", expected.trim(), actual);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str = "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03";

    #[test]
    fn check_ignores_case_and_padding() {
        assert!(check(HELLO, &format!(" {} ", HELLO.to_uppercase())).is_ok());
        assert!(check(HELLO, "00").is_err());
    }

    #[tokio::test]
    async fn verify_accepts_matching_and_rejects_other_digests() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("chair.zip");
        std::fs::write(&file, b"hello\n").unwrap();

        assert_eq!(digest_of(file.clone()).await.unwrap(), HELLO);
        assert!(run_checksum(&file, Some(HELLO)).await.is_ok());
        let err = run_checksum(&file, Some(&"0".repeat(64))).await.unwrap_err();
        assert!(err.to_string().contains("digest mismatch"), "{err:#}");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_checksum(&dir.path().join("nope"), None).await.is_err());
    }
}
