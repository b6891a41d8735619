//! Tests for watch, checksum, completions, man.

use super::parse;
use crate::cli::CliCommand;

#[test]
fn cli_parse_watch() {
    match parse(&["adl", "watch", "--dest", "out"]) {
        CliCommand::Watch { dest } => {
            assert_eq!(dest.dest.as_deref(), Some(std::path::Path::new("out")));
        }
        _ => panic!("expected Watch"),
    }
}

#[test]
fn cli_parse_checksum() {
    match parse(&["adl", "checksum", "/path/to/file"]) {
        CliCommand::Checksum { path, verify } => {
            assert_eq!(path, std::path::PathBuf::from("/path/to/file"));
            assert_eq!(verify, None);
        }
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn cli_parse_checksum_verify() {
    match parse(&["adl", "checksum", "a.zip", "--verify", "ABCDEF"]) {
        CliCommand::Checksum { verify, .. } => assert_eq!(verify.as_deref(), Some("ABCDEF")),
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["adl", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, clap_complete::Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_parse_man() {
    match parse(&["adl", "man"]) {
        CliCommand::Man => {}
        _ => panic!("expected Man"),
    }
}
