//! `grab list` – print the lock file's resources.

use anyhow::Result;
use grab_core::{Manifest, TagFilter};
use std::path::Path;

pub fn run_list(lock: &Path, tags: Vec<String>, notags: Vec<String>) -> Result<()> {
    let manifest = Manifest::load(lock, false)?;
    let filter = TagFilter::new(tags, notags);
    let selected = manifest.select(&filter);
    if selected.is_empty() {
        println!("No resources.");
        return Ok(());
    }
    for r in selected {
        println!("{}", r.output_filename());
        println!("  integrity: {}", r.integrity());
        for url in r.urls() {
            println!("  url:       {}", url);
        }
        if !r.tags().is_empty() {
            println!("  tags:      {}", r.tags().join(", "));
        }
    }
    Ok(())
}
