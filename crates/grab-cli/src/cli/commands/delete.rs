//! `grab delete <url-or-filename>` – drop matching resources from the lock file.

use anyhow::{Context, Result};
use grab_core::Manifest;
use std::path::Path;

pub fn run_delete(lock: &Path, target: &str) -> Result<()> {
    let mut manifest = Manifest::load(lock, false)?;
    let removed = manifest.delete_resource(target);
    if removed == 0 {
        println!("No resource matches '{target}'");
        return Ok(());
    }
    manifest
        .save()
        .with_context(|| format!("saving {}", lock.display()))?;
    println!("Removed {removed} resource(s)");
    Ok(())
}
