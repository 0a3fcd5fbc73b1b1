//! `grab add <urls...>` – fetch once, record the integrity, save the lock file.

use anyhow::{Context, Result};
use grab_core::config::GrabConfig;
use grab_core::Manifest;
use std::path::Path;

pub async fn run_add(
    lock: &Path,
    cfg: &GrabConfig,
    urls: Vec<String>,
    algo: &str,
    tags: Vec<String>,
    filename: Option<String>,
) -> Result<()> {
    let mut manifest = Manifest::load(lock, true)?;
    let resource = manifest
        .add_resource(urls, algo, tags, filename, &cfg.transfer_options())
        .await?;
    println!(
        "Added {} ({})",
        resource.primary_url(),
        resource.integrity()
    );
    manifest
        .save()
        .with_context(|| format!("saving {}", lock.display()))?;
    Ok(())
}
