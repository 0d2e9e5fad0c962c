//! In-memory coupon catalog

use super::{CouponProvider, ProviderError};
use crate::models::Coupon;
use async_trait::async_trait;
use std::collections::HashMap;

/// Serves coupons from memory: per-domain entries first, then a fallback
/// list shared by every other domain.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    by_domain: HashMap<String, Vec<Coupon>>,
    fallback: Vec<Coupon>,
}

impl StaticCatalog {
    /// The same coupons for every domain.
    pub fn new(coupons: Vec<Coupon>) -> Self {
        Self {
            by_domain: HashMap::new(),
            fallback: coupons,
        }
    }

    pub fn demo() -> Self {
        Self::new(super::demo_coupons())
    }

    pub fn with_domain(mut self, domain: impl Into<String>, coupons: Vec<Coupon>) -> Self {
        self.by_domain.insert(domain.into().to_lowercase(), coupons);
        self
    }
}

#[async_trait]
impl CouponProvider for StaticCatalog {
    async fn fetch_coupons(&self, domain: &str) -> Result<Vec<Coupon>, ProviderError> {
        let coupons = self
            .by_domain
            .get(&domain.to_lowercase())
            .unwrap_or(&self.fallback)
            .clone();
        Ok(coupons)
    }
}
