//! Tests for add and download.

use super::{parse, parse_cli};
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn cli_parse_add_with_mirrors() {
    match parse(&["grab", "add", "https://a/x.tgz", "https://b/x.tgz"]) {
        CliCommand::Add {
            urls,
            algo,
            tags,
            filename,
        } => {
            assert_eq!(urls, vec!["https://a/x.tgz", "https://b/x.tgz"]);
            assert!(algo.is_none());
            assert!(tags.is_empty());
            assert!(filename.is_none());
        }
        _ => panic!("expected Add"),
    }
}

#[test]
fn cli_parse_add_with_options() {
    match parse(&[
        "grab",
        "add",
        "https://a/x.tgz",
        "--algo",
        "sha512",
        "--tag",
        "linux",
        "--tag",
        "amd64",
        "--filename",
        "x.tar.gz",
    ]) {
        CliCommand::Add {
            urls,
            algo,
            tags,
            filename,
        } => {
            assert_eq!(urls, vec!["https://a/x.tgz"]);
            assert_eq!(algo.as_deref(), Some("sha512"));
            assert_eq!(tags, vec!["linux", "amd64"]);
            assert_eq!(filename.as_deref(), Some("x.tar.gz"));
        }
        _ => panic!("expected Add with options"),
    }
}

#[test]
fn cli_parse_add_requires_a_url() {
    assert!(Cli::try_parse_from(["grab", "add"]).is_err());
}

#[test]
fn cli_parse_download_defaults() {
    let cli = parse_cli(&["grab", "download"]);
    assert_eq!(cli.lock, PathBuf::from("grabit.lock"));
    match cli.command {
        CliCommand::Download {
            dir,
            tags,
            notags,
            perm,
            status,
        } => {
            assert_eq!(dir, PathBuf::from("."));
            assert!(tags.is_empty());
            assert!(notags.is_empty());
            assert!(perm.is_none());
            assert!(!status);
        }
        _ => panic!("expected Download"),
    }
}

#[test]
fn cli_parse_download_full() {
    let cli = parse_cli(&[
        "grab", "download", "--dir", "out", "--tag", "x", "--notag", "y", "--notag", "z",
        "--perm", "644", "--status", "-f", "other.lock",
    ]);
    assert_eq!(cli.lock, PathBuf::from("other.lock"));
    match cli.command {
        CliCommand::Download {
            dir,
            tags,
            notags,
            perm,
            status,
        } => {
            assert_eq!(dir, PathBuf::from("out"));
            assert_eq!(tags, vec!["x"]);
            assert_eq!(notags, vec!["y", "z"]);
            assert_eq!(perm.as_deref(), Some("644"));
            assert!(status);
        }
        _ => panic!("expected Download with flags"),
    }
}
