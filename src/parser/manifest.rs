//! manifest.json parsing

use crate::models::Manifest;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse a manifest. JSON5 is accepted so hand-edited manifests with
/// comments or trailing commas load too.
pub fn parse_manifest(content: &[u8]) -> Result<Manifest> {
    let text = std::str::from_utf8(content).context("manifest.json is not valid UTF-8")?;

    let manifest: Manifest = json5::from_str(text).context("Failed to parse manifest.json")?;

    if manifest.manifest_version != 3 {
        anyhow::bail!(
            "Unsupported manifest version {} (CouponFinder targets MV3)",
            manifest.manifest_version
        );
    }

    Ok(manifest)
}

pub fn parse_manifest_from_file(path: impl AsRef<Path>) -> Result<Manifest> {
    let path = path.as_ref();
    let content = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_manifest(&content)
}

pub fn parse_manifest_from_str(content: &str) -> Result<Manifest> {
    parse_manifest(content.as_bytes())
}
