//! Coupon providers
//!
//! A provider turns a domain into the coupons known for it. Providers never
//! retry or cache; the content agent fetches once per page.

pub mod catalog;
#[cfg(not(target_arch = "wasm32"))]
pub mod http;

pub use catalog::StaticCatalog;
#[cfg(not(target_arch = "wasm32"))]
pub use http::{CouponRecord, HttpCouponProvider, ServiceCoupon};

use crate::models::Coupon;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[cfg(not(target_arch = "wasm32"))]
    #[error("coupon request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("coupon provider returned HTTP {0}")]
    Status(u16),

    #[error("coupon provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CouponProvider: Send + Sync {
    /// Coupons for `domain`, in the provider's order.
    async fn fetch_coupons(&self, domain: &str) -> Result<Vec<Coupon>, ProviderError>;
}

/// Two sample coupons served when no provider is configured.
pub fn demo_coupons() -> Vec<Coupon> {
    vec![
        Coupon::new("SAVE20", "20% off your order", 85.0, "2024-12-28"),
        Coupon::new("FREESHIP", "Free shipping on orders over $50", 92.0, "2024-12-29"),
    ]
}
