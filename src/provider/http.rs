//! HTTP coupon provider

use super::{CouponProvider, ProviderError};
use crate::models::Coupon;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("coupon-finder/", env!("CARGO_PKG_VERSION"));

/// Coupon as stored by the coupon service. `score` is the net vote count.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceCoupon {
    pub id: String,
    pub code: String,
    pub description: String,
    #[serde(default)]
    pub expiry: Option<String>,
    pub domain: String,
    pub score: i64,
    pub created_at: String,
}

impl From<ServiceCoupon> for Coupon {
    /// The score is clamped into the 0-100 success rate range.
    fn from(coupon: ServiceCoupon) -> Self {
        Coupon::new(
            coupon.code,
            coupon.description,
            coupon.score.clamp(0, 100) as f64,
            coupon.created_at,
        )
    }
}

/// Either record shape a provider may answer with.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CouponRecord {
    Extension(Coupon),
    Service(ServiceCoupon),
}

impl From<CouponRecord> for Coupon {
    fn from(record: CouponRecord) -> Self {
        match record {
            CouponRecord::Extension(coupon) => coupon,
            CouponRecord::Service(coupon) => coupon.into(),
        }
    }
}

/// Looks coupons up with `GET {base_url}/coupon?domain=<domain>`; the body is
/// a JSON array of [`CouponRecord`]s.
#[derive(Debug, Clone)]
pub struct HttpCouponProvider {
    client: Client,
    base_url: Url,
}

impl HttpCouponProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        // Without a trailing slash `join` would replace the last segment.
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    pub fn coupon_url(&self, domain: &str) -> Result<Url, ProviderError> {
        let mut url = self.base_url.join("coupon")?;
        url.query_pairs_mut().append_pair("domain", domain);
        Ok(url)
    }
}

#[async_trait]
impl CouponProvider for HttpCouponProvider {
    async fn fetch_coupons(&self, domain: &str) -> Result<Vec<Coupon>, ProviderError> {
        let url = self.coupon_url(domain)?;
        tracing::debug!(%url, "requesting coupons");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let records: Vec<CouponRecord> = response.json().await?;
        Ok(records.into_iter().map(Coupon::from).collect())
    }
}
