//! CLI for the ADL asset downloader.

mod commands;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use commands::{
    run_checksum, run_completions, run_fetch, run_get, run_man, run_watch, ConflictPolicy,
    GetRequest,
};

/// Top-level CLI for the ADL asset downloader.
#[derive(Debug, Parser)]
#[command(name = "adl")]
#[command(
    about = "ADL: download an asset archive, unpack nested archives, merge into a folder and credit the author",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Where the asset goes and what to do when that folder already exists.
#[derive(Debug, Clone, Args)]
pub struct DestinationArgs {
    /// Destination root; the asset lands in `<DIR>/<name>` (default: `destination_root` from config).
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// If the destination exists, download into a new numbered sibling without asking.
    #[arg(long, short = 'y', conflicts_with = "skip_existing")]
    pub yes: bool,

    /// If the destination exists, keep it and skip without asking.
    #[arg(long)]
    pub skip_existing: bool,
}

impl DestinationArgs {
    pub fn policy(&self) -> ConflictPolicy {
        if self.yes {
            ConflictPolicy::Continue
        } else if self.skip_existing {
            ConflictPolicy::Skip
        } else {
            ConflictPolicy::Ask
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download the asset described by a payload.
    Fetch {
        /// Payload JSON (optionally prefixed `unity-asset-payload::`), `-` for stdin, or `@FILE`.
        payload: String,

        #[command(flatten)]
        dest: DestinationArgs,
    },

    /// Download an archive by URL, giving the payload fields as flags.
    Get {
        /// Direct HTTP/HTTPS URL of the archive.
        download_url: String,

        /// Asset name; also the destination folder name.
        #[arg(long)]
        name: String,

        /// Author to credit.
        #[arg(long)]
        creator: Option<String>,

        /// License of the asset.
        #[arg(long)]
        license: Option<String>,

        /// Page the asset came from.
        #[arg(long)]
        source_url: Option<String>,

        #[command(flatten)]
        dest: DestinationArgs,
    },

    /// Watch the clipboard and download every payload copied to it.
    Watch {
        #[command(flatten)]
        dest: DestinationArgs,
    },

    /// Compute SHA-256 of a file (compare with the digest in an attribution record).
    Checksum {
        /// Path to the file.
        path: PathBuf,

        /// Expected hex digest; exit with an error when it differs.
        #[arg(long, value_name = "HEX")]
        verify: Option<String>,
    },

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },

    /// Print the man page to stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Fetch { payload, dest } => run_fetch(&payload, &dest).await?,
            CliCommand::Get {
                download_url,
                name,
                creator,
                license,
                source_url,
                dest,
            } => {
                let request = GetRequest {
                    download_url,
                    name,
                    creator,
                    license,
                    source_url,
                };
                run_get(request, &dest).await?;
            }
            CliCommand::Watch { dest } => run_watch(&dest).await?,
            CliCommand::Checksum { path, verify } => {
                run_checksum(&path, verify.as_deref()).await?
            }
            CliCommand::Completions { shell } => run_completions(shell, &mut Cli::command())?,
            CliCommand::Man => run_man(Cli::command())?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
