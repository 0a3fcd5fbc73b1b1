//! CLI for grab: declare artifacts in a lock file and fetch them verified.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use grab_core::config::{self, GrabConfig};
use std::path::{Path, PathBuf};

use commands::{run_add, run_checksum, run_delete, run_download, run_list, DownloadArgs};

/// Top-level CLI for grab.
#[derive(Debug, Parser)]
#[command(name = "grab")]
#[command(about = "grab: fetch artifacts declared in a lock file and verify their integrity", long_about = None)]
pub struct Cli {
    /// Lock file to operate on.
    #[arg(short = 'f', long = "lock", global = true, default_value = "grabit.lock")]
    pub lock: PathBuf,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch URLs and record them, with their integrity, as one resource.
    Add {
        /// Primary URL followed by mirrors.
        #[arg(required = true)]
        urls: Vec<String>,
        /// Digest algorithm (sha256, sha384, sha512). Defaults to the configured one.
        #[arg(long)]
        algo: Option<String>,
        /// Tag to attach (repeatable).
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Name to save the artifact under instead of the URL's last segment.
        #[arg(long)]
        filename: Option<String>,
    },

    /// Remove every resource with this URL or output filename.
    Delete {
        target: String,
    },

    /// Download the selected resources into a directory.
    Download {
        /// Destination directory (must exist).
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        /// Only resources carrying this tag (repeatable; all must match).
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Skip resources carrying this tag (repeatable).
        #[arg(long = "notag")]
        notags: Vec<String>,
        /// Octal permission for downloaded files, e.g. 644.
        #[arg(long)]
        perm: Option<String>,
        /// Show a live status line.
        #[arg(long)]
        status: bool,
    },

    /// Print the resources of the lock file.
    List {
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long = "notag")]
        notags: Vec<String>,
    },

    /// Compute the integrity string of a local file.
    Checksum {
        path: PathBuf,
        #[arg(long)]
        algo: Option<String>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = load_config();
        tracing::debug!("loaded config: {:?}", cfg);
        let lock = cli.lock.as_path();

        match cli.command {
            CliCommand::Add {
                urls,
                algo,
                tags,
                filename,
            } => {
                let algo = algo.unwrap_or_else(|| cfg.default_algorithm.clone());
                run_add(lock, &cfg, urls, &algo, tags, filename).await?;
            }
            CliCommand::Delete { target } => run_delete(lock, &target)?,
            CliCommand::Download {
                dir,
                tags,
                notags,
                perm,
                status,
            } => {
                let args = DownloadArgs {
                    dir,
                    tags,
                    notags,
                    perm,
                    status,
                };
                run_download(lock, &cfg, args).await?;
            }
            CliCommand::List { tags, notags } => run_list(lock, tags, notags)?,
            CliCommand::Checksum { path, algo } => {
                let algo = algo.unwrap_or_else(|| cfg.default_algorithm.clone());
                run_checksum(Path::new(&path), &algo).await?;
            }
        }

        Ok(())
    }
}

/// A broken or unwritable config never blocks a command.
fn load_config() -> GrabConfig {
    match config::load_or_init() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("using default config: {:#}", e);
            GrabConfig::default()
        }
    }
}

#[cfg(test)]
mod tests;
