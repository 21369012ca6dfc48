//! Clean the generated title cards

use anyhow::Result;
use std::fs;

use crate::Site;

/// Remove the images directory
pub fn run(site: &Site) -> Result<()> {
    if site.images_dir.exists() {
        fs::remove_dir_all(&site.images_dir)?;
        tracing::info!("Deleted: {:?}", site.images_dir);
    }

    Ok(())
}
