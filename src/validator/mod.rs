//! Manifest validation

pub mod capabilities;
pub mod structure;

pub use capabilities::{missing_capabilities, Capability};

use crate::models::Manifest;
use anyhow::Result;

/// Check required fields and that every host capability the agents rely on
/// is granted.
pub fn validate_manifest(manifest: &Manifest) -> Result<()> {
    structure::validate_structure(manifest)?;

    let missing = missing_capabilities(manifest);
    if !missing.is_empty() {
        let names: Vec<String> = missing.iter().map(|c| c.to_string()).collect();
        anyhow::bail!("Manifest is missing required capabilities: {}", names.join(", "));
    }

    Ok(())
}
