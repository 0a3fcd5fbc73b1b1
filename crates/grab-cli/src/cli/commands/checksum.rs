//! `grab checksum <path>` – integrity string of a local file.

use anyhow::{Context, Result};
use grab_core::{Algorithm, Integrity};
use std::path::Path;

pub async fn run_checksum(path: &Path, algo: &str) -> Result<()> {
    let algorithm: Algorithm = algo.parse()?;
    let integrity = Integrity::of_path(path, algorithm)
        .with_context(|| format!("hashing {}", path.display()))?;
    println!("{}  {}", integrity, path.display());
    Ok(())
}
