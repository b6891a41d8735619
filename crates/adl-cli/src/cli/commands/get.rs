//! `adl get <url> --name NAME` – download an archive with payload fields given as flags.

use anyhow::{Context, Result};
use adl_core::payload::Payload;

use super::run::{self, Runner};
use crate::cli::DestinationArgs;

/// Flag values of `adl get`.
#[derive(Debug, Clone)]
pub struct GetRequest {
    pub download_url: String,
    pub name: String,
    pub creator: Option<String>,
    pub license: Option<String>,
    pub source_url: Option<String>,
}

impl GetRequest {
    fn into_payload(self) -> Result<Payload> {
        let payload = Payload {
            name: self.name,
            creator_name: self.creator,
            license: self.license,
            source_url: self.source_url,
            download_url: self.download_url,
        };
        payload.validate().context("invalid arguments")?;
        Ok(payload)
    }
}

pub async fn run_get(request: GetRequest, dest: &DestinationArgs) -> Result<()> {
    let payload = request.into_payload()?;
    let (runner, _cfg) = Runner::from_args(dest)?;
    let outcome = runner.run(payload).await?;
    run::check(&outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str, name: &str) -> GetRequest {
        GetRequest {
            download_url: url.to_string(),
            name: name.to_string(),
            creator: Some("Kenney".to_string()),
            license: None,
            source_url: None,
        }
    }

    #[test]
    fn flags_become_payload() {
        let payload = request("https://x/chair.zip", "Chair").into_payload().unwrap();
        assert_eq!(payload.name, "Chair");
        assert_eq!(payload.creator_name.as_deref(), Some("Kenney"));
        assert_eq!(payload.download_url, "https://x/chair.zip");
    }

    #[test]
    fn rejects_blank_name_and_bad_url() {
        assert!(request("https://x/chair.zip", "  ").into_payload().is_err());
        assert!(request("not a url", "Chair").into_payload().is_err());
    }
}
