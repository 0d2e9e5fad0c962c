//! Background agent: one per browser session

use crate::host::{notify, HostEvent, TabId, TabMessenger, TabStatus};
use crate::models::Signal;
use crate::page::is_checkout_navigation;
use tokio::sync::mpsc;

/// Watches tab navigation and pings content agents on checkout-like pages.
pub struct BackgroundAgent<M> {
    messenger: M,
}

impl<M: TabMessenger> BackgroundAgent<M> {
    pub fn new(messenger: M) -> Self {
        Self { messenger }
    }

    pub fn on_installed(&self) {
        tracing::info!("[CouponFinder] Extension installed.");
    }

    /// Returns whether a `CHECK_FOR_COUPON` signal was sent. Delivery
    /// failures are ignored; nothing waits for an answer.
    pub fn on_tab_updated(&self, tab: TabId, status: TabStatus, url: Option<&str>) -> bool {
        let url = match (status, url) {
            (TabStatus::Complete, Some(url)) => url,
            _ => return false,
        };

        if !is_checkout_navigation(url) {
            return false;
        }

        if let Err(err) = notify(&self.messenger, tab, Signal::CheckForCoupon) {
            tracing::debug!(%tab, error = %err, "checkout signal not delivered");
        } else {
            tracing::debug!(%tab, url, "checkout navigation signalled");
        }
        true
    }

    pub fn handle_event(&self, event: &HostEvent) {
        match event {
            HostEvent::Installed => self.on_installed(),
            HostEvent::TabUpdated { tab, status, url } => {
                self.on_tab_updated(*tab, *status, url.as_deref());
            }
        }
    }

    /// Process host events until the host goes away.
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<HostEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(&event);
        }
    }
}
