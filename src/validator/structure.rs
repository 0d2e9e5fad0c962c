//! Structural validation

use crate::models::Manifest;
use anyhow::Result;

pub fn validate_structure(manifest: &Manifest) -> Result<()> {
    if manifest.name.trim().is_empty() {
        anyhow::bail!("Manifest name is required");
    }

    if manifest.version.trim().is_empty() {
        anyhow::bail!("Manifest version is required");
    }

    if manifest.manifest_version != 3 {
        anyhow::bail!("Only Manifest V3 is supported");
    }

    for script in &manifest.content_scripts {
        if script.matches.is_empty() {
            anyhow::bail!("Content script entry has no match patterns");
        }
    }

    Ok(())
}
