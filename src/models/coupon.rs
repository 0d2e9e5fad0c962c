//! Coupon records and the per-page coupon cache

use serde::{Deserialize, Serialize};

/// A coupon as supplied by the provider. Never mutated after a fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub description: String,
    /// Percentage, 0-100, as reported by the provider.
    pub success_rate: f64,
    /// Provider-supplied date string, passed through untouched.
    pub last_tested: String,
}

impl Coupon {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        success_rate: f64,
        last_tested: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            success_rate,
            last_tested: last_tested.into(),
        }
    }
}

/// Lifecycle of the single coupon fetch a page performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    /// The page did not look like a checkout page; no fetch was made.
    Skipped,
    Pending,
    Ready,
    Failed,
}

impl FetchStatus {
    pub fn is_settled(self) -> bool {
        !matches!(self, FetchStatus::Pending)
    }
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStatus::Skipped => write!(f, "skipped"),
            FetchStatus::Pending => write!(f, "pending"),
            FetchStatus::Ready => write!(f, "ready"),
            FetchStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Coupons cached for one page, in provider order.
///
/// Filled at most once. Reads before the fetch settles see an empty,
/// non-failed cache.
#[derive(Debug, Clone)]
pub struct CouponCache {
    coupons: Vec<Coupon>,
    status: FetchStatus,
}

impl CouponCache {
    /// Cache for a page that is about to fetch.
    pub fn pending() -> Self {
        Self {
            coupons: Vec::new(),
            status: FetchStatus::Pending,
        }
    }

    /// Cache for a page that will never fetch.
    pub fn skipped() -> Self {
        Self {
            coupons: Vec::new(),
            status: FetchStatus::Skipped,
        }
    }

    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    pub fn failed(&self) -> bool {
        self.status == FetchStatus::Failed
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    /// Store a successful fetch. Returns false if the cache already settled.
    pub fn fill(&mut self, coupons: Vec<Coupon>) -> bool {
        if self.status != FetchStatus::Pending {
            return false;
        }
        self.coupons = coupons;
        self.status = FetchStatus::Ready;
        true
    }

    /// Record a failed fetch. Returns false if the cache already settled.
    pub fn mark_failed(&mut self) -> bool {
        if self.status != FetchStatus::Pending {
            return false;
        }
        self.coupons.clear();
        self.status = FetchStatus::Failed;
        true
    }
}

impl Default for CouponCache {
    fn default() -> Self {
        Self::pending()
    }
}
