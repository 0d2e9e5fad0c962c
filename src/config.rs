//! Runtime configuration
//!
//! Read from a JSON5 file; every field has a default so an empty file (or
//! no file) is valid.

use crate::models::Coupon;
use crate::provider::{demo_coupons, CouponProvider, StaticCatalog};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,

    /// How long the popup waits for a content agent reply. `null` waits
    /// indefinitely.
    pub request_timeout_ms: Option<u64>,

    /// Tracing filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderConfig {
    Static {
        #[serde(default = "demo_coupons")]
        coupons: Vec<Coupon>,
    },
    Http {
        base_url: String,
        #[serde(default = "default_provider_timeout")]
        timeout_secs: u64,
    },
}

fn default_provider_timeout() -> u64 {
    DEFAULT_PROVIDER_TIMEOUT_SECS
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Static {
            coupons: demo_coupons(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            request_timeout_ms: Some(DEFAULT_REQUEST_TIMEOUT_MS),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_str(content: &str) -> Result<Self> {
        json5::from_str(content).context("Failed to parse configuration")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn build_provider(&self) -> Result<Arc<dyn CouponProvider>> {
        match &self.provider {
            ProviderConfig::Static { coupons } => Ok(Arc::new(StaticCatalog::new(coupons.clone()))),
            #[cfg(not(target_arch = "wasm32"))]
            ProviderConfig::Http { base_url, timeout_secs } => {
                let provider =
                    crate::provider::HttpCouponProvider::new(base_url, Duration::from_secs(*timeout_secs))
                        .context("Failed to set up HTTP coupon provider")?;
                Ok(Arc::new(provider))
            }
            #[cfg(target_arch = "wasm32")]
            ProviderConfig::Http { .. } => anyhow::bail!("The HTTP coupon provider is not available in wasm builds"),
        }
    }
}
