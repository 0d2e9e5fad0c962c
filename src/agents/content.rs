//! Content agent: one per page
//!
//! Owns the page and its coupon cache. Runs detection once at startup,
//! fetches coupons in the background when the page looks like a checkout,
//! and answers popup requests from whatever the cache holds at that moment.

use crate::host::{Clipboard, Envelope};
use crate::models::{
    ApplyCouponResponse, Coupon, CouponCache, CouponsFoundResponse, ErrorResponse, FetchStatus, Message,
    Request, Response, Signal, ERR_APPLY_FAILED, ERR_COPY_FAILED,
};
use crate::page::{checkout_signal, find_coupon_field, FieldEvent, FieldId, Page, PageError};
use crate::provider::{CouponProvider, ProviderError};
use futures::future::{BoxFuture, FutureExt, OptionFuture};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};

type CouponFetch = BoxFuture<'static, Result<Vec<Coupon>, ProviderError>>;

pub struct ContentAgent<P: Page> {
    page: P,
    cache: CouponCache,
    clipboard: Arc<dyn Clipboard>,
}

impl<P: Page> ContentAgent<P> {
    pub fn new(page: P, clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            page,
            cache: CouponCache::pending(),
            clipboard,
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn cache(&self) -> &CouponCache {
        &self.cache
    }

    /// Run detection and, on a checkout page, wait for the fetch to settle.
    pub async fn initialize(&mut self, provider: Arc<dyn CouponProvider>) {
        if let Some(fetch) = self.begin_fetch(provider) {
            let result = fetch.await;
            self.settle(result);
        }
    }

    fn begin_fetch(&mut self, provider: Arc<dyn CouponProvider>) -> Option<CouponFetch> {
        match checkout_signal(&self.page) {
            None => {
                tracing::debug!(url = self.page.href(), "not a checkout page, skipping coupon lookup");
                self.cache = CouponCache::skipped();
                None
            }
            Some(signal) => {
                let domain = self.page.hostname().to_string();
                tracing::info!(%domain, %signal, "checkout page detected, fetching coupons");
                self.cache = CouponCache::pending();
                Some(async move { provider.fetch_coupons(&domain).await }.boxed())
            }
        }
    }

    fn settle(&mut self, result: Result<Vec<Coupon>, ProviderError>) {
        match result {
            Ok(coupons) => {
                let count = coupons.len();
                if self.cache.fill(coupons) {
                    tracing::info!(count, "coupons cached");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch coupons");
                self.cache.mark_failed();
            }
        }
    }

    /// Handle one raw inbound message. Returns the reply for requests and
    /// `None` for signals.
    pub async fn handle_message(&mut self, payload: Value) -> Option<Value> {
        let response = match Message::from_value(payload) {
            Ok(Message::Request(request)) => self.handle_request(request).await,
            Ok(Message::Signal(signal)) => {
                self.handle_signal(signal);
                return None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "rejecting message");
                Response::Rejected(ErrorResponse::invalid_message_type())
            }
        };

        if !response.success() {
            tracing::debug!(error = response.error().unwrap_or_default(), "request not fulfilled");
        }

        match response.to_value() {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::error!(error = %err, "failed to encode response");
                None
            }
        }
    }

    pub async fn handle_request(&mut self, request: Request) -> Response {
        tracing::debug!(kind = request.kind(), "handling request");
        match request {
            Request::CouponsFound => Response::CouponsFound(CouponsFoundResponse::from_cache(&self.cache)),
            Request::ApplyCoupon { code } => Response::ApplyCoupon(self.apply_coupon(&code).await),
        }
    }

    fn handle_signal(&self, signal: Signal) {
        let kind = signal.kind();
        match signal {
            Signal::CheckForCoupon => {
                tracing::debug!(kind, status = %self.cache.status(), "background flagged a checkout navigation");
            }
        }
    }

    async fn apply_coupon(&mut self, code: &str) -> ApplyCouponResponse {
        if let Some(field) = find_coupon_field(&self.page) {
            return match self.inject(field.id, code) {
                Ok(()) => {
                    tracing::info!(field = %field.id, "coupon applied");
                    ApplyCouponResponse::applied()
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to apply coupon");
                    ApplyCouponResponse::failure(ERR_APPLY_FAILED)
                }
            };
        }

        match self.clipboard.write_text(code).await {
            Ok(()) => {
                tracing::info!("no coupon field found, code copied to clipboard");
                ApplyCouponResponse::copied()
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to copy coupon to clipboard");
                ApplyCouponResponse::failure(ERR_COPY_FAILED)
            }
        }
    }

    fn inject(&mut self, field: FieldId, code: &str) -> Result<(), PageError> {
        self.page.set_field_value(field, code)?;
        self.page.dispatch_event(field, FieldEvent::input())
    }

    async fn dispatch(&mut self, envelope: Envelope) {
        let reply = self.handle_message(envelope.payload).await;
        match (reply, envelope.reply) {
            (Some(reply), Some(tx)) => {
                if tx.send(reply).is_err() {
                    tracing::debug!("requester went away before the reply was sent");
                }
            }
            (Some(_), None) => tracing::debug!("request arrived without a reply channel"),
            _ => {}
        }
    }
}

impl<P: Page + 'static> ContentAgent<P> {
    /// Start the agent on its own task. The coupon fetch runs concurrently
    /// with message handling; requests that arrive first see the empty cache.
    pub fn spawn(
        self,
        provider: Arc<dyn CouponProvider>,
        mailbox: mpsc::UnboundedReceiver<Envelope>,
    ) -> ContentHandle<P> {
        let (status_tx, status_rx) = watch::channel(FetchStatus::Pending);
        let task = tokio::spawn(self.run(provider, mailbox, status_tx));
        ContentHandle {
            status: status_rx,
            task,
        }
    }

    async fn run(
        mut self,
        provider: Arc<dyn CouponProvider>,
        mut mailbox: mpsc::UnboundedReceiver<Envelope>,
        status: watch::Sender<FetchStatus>,
    ) -> P {
        let mut fetch = self.begin_fetch(provider);
        status.send_replace(self.cache.status());

        loop {
            tokio::select! {
                Some(result) = OptionFuture::from(fetch.as_mut()), if fetch.is_some() => {
                    fetch = None;
                    self.settle(result);
                    status.send_replace(self.cache.status());
                }
                envelope = mailbox.recv() => match envelope {
                    Some(envelope) => self.dispatch(envelope).await,
                    None => break,
                },
            }
        }

        tracing::debug!(url = self.page.href(), "content agent detached");
        self.page
    }
}

/// Handle on a spawned content agent.
pub struct ContentHandle<P> {
    status: watch::Receiver<FetchStatus>,
    task: JoinHandle<P>,
}

impl<P> ContentHandle<P> {
    pub fn status(&self) -> FetchStatus {
        *self.status.borrow()
    }

    /// Wait until the coupon fetch has settled (or was skipped).
    pub async fn settled(&mut self) -> FetchStatus {
        loop {
            let current = *self.status.borrow();
            if current.is_settled() {
                return current;
            }
            if self.status.changed().await.is_err() {
                return *self.status.borrow();
            }
        }
    }

    /// Wait for the agent to stop (its mailbox closed) and take the page back.
    pub async fn join(self) -> Result<P, JoinError> {
        self.task.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryClipboard;
    use crate::models::{ERR_FETCH_FAILED, ERR_INVALID_MESSAGE_TYPE};
    use crate::page::{HtmlPage, InputField};
    use crate::provider::StaticCatalog;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Unavailable;

    #[async_trait]
    impl CouponProvider for Unavailable {
        async fn fetch_coupons(&self, _domain: &str) -> Result<Vec<Coupon>, ProviderError> {
            Err(ProviderError::Unavailable("offline".to_string()))
        }
    }

    /// A page whose only input refuses updates.
    struct FrozenPage;

    impl Page for FrozenPage {
        fn href(&self) -> &str {
            "https://shop.example.com/checkout"
        }

        fn hostname(&self) -> &str {
            "shop.example.com"
        }

        fn body_text(&self) -> String {
            String::new()
        }

        fn input_fields(&self) -> Vec<InputField> {
            vec![InputField {
                id: FieldId(0),
                name: Some("coupon".to_string()),
                element_id: None,
                placeholder: None,
            }]
        }

        fn set_field_value(&mut self, field: FieldId, _value: &str) -> Result<(), PageError> {
            Err(PageError::Rejected(field, "detached".to_string()))
        }

        fn dispatch_event(&mut self, _field: FieldId, _event: FieldEvent) -> Result<(), PageError> {
            Ok(())
        }
    }

    fn checkout_page(body: &str) -> HtmlPage {
        HtmlPage::parse("https://shop.example.com/checkout", body).unwrap()
    }

    #[tokio::test]
    async fn test_coupons_found_after_fetch() {
        let mut agent = ContentAgent::new(checkout_page("<body></body>"), Arc::new(MemoryClipboard::new()));
        agent.initialize(Arc::new(StaticCatalog::demo())).await;

        let reply = agent.handle_message(json!({ "type": "COUPONS_FOUND" })).await.unwrap();
        assert_eq!(reply["success"], true);
        assert_eq!(reply["coupons"][0]["code"], "SAVE20");
        assert_eq!(reply["coupons"][1]["code"], "FREESHIP");
        assert!(reply.get("error").is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_reports_failure() {
        let mut agent = ContentAgent::new(checkout_page("<body></body>"), Arc::new(MemoryClipboard::new()));
        agent.initialize(Arc::new(Unavailable)).await;

        let reply = agent.handle_message(json!({ "type": "COUPONS_FOUND" })).await.unwrap();
        assert_eq!(
            reply,
            json!({ "success": false, "coupons": [], "error": ERR_FETCH_FAILED })
        );
        assert_eq!(agent.cache().status(), FetchStatus::Failed);
    }

    #[tokio::test]
    async fn test_non_checkout_page_never_fetches() {
        let page = HtmlPage::parse("https://shop.example.com/products/1", "<body>Nice shoes</body>").unwrap();
        let mut agent = ContentAgent::new(page, Arc::new(MemoryClipboard::new()));
        agent.initialize(Arc::new(Unavailable)).await;

        assert_eq!(agent.cache().status(), FetchStatus::Skipped);
        let reply = agent.handle_message(json!({ "type": "COUPONS_FOUND" })).await.unwrap();
        assert_eq!(reply, json!({ "success": true, "coupons": [] }));
    }

    #[tokio::test]
    async fn test_apply_into_field() {
        let page = checkout_page(r#"<body><input id="promo-code"></body>"#);
        let mut agent = ContentAgent::new(page, Arc::new(MemoryClipboard::new()));

        let reply = agent
            .handle_message(json!({ "type": "APPLY_COUPON", "code": "FREESHIP" }))
            .await
            .unwrap();
        assert_eq!(reply, json!({ "success": true, "applied": true, "copied": false }));

        let field = agent.page().field_by_element_id("promo-code").unwrap().id;
        assert_eq!(agent.page().value(field), Some("FREESHIP"));
        assert_eq!(agent.page().events(field), &[FieldEvent::input()]);
        assert!(agent.page().events(field)[0].bubbles);
    }

    #[tokio::test]
    async fn test_apply_failure_on_rejected_update() {
        let mut agent = ContentAgent::new(FrozenPage, Arc::new(MemoryClipboard::new()));
        let response = agent.handle_request(Request::apply("SAVE20")).await;
        assert_eq!(
            response,
            Response::ApplyCoupon(ApplyCouponResponse::failure(ERR_APPLY_FAILED))
        );
    }

    #[tokio::test]
    async fn test_clipboard_fallback() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let mut agent = ContentAgent::new(checkout_page("<body><input name=\"email\"></body>"), clipboard.clone());

        let response = agent.handle_request(Request::apply("SAVE20")).await;
        assert_eq!(response, Response::ApplyCoupon(ApplyCouponResponse::copied()));
        assert_eq!(clipboard.contents().as_deref(), Some("SAVE20"));
    }

    #[tokio::test]
    async fn test_clipboard_denied() {
        let mut agent = ContentAgent::new(checkout_page("<body></body>"), Arc::new(MemoryClipboard::denied()));
        let reply = agent
            .handle_message(json!({ "type": "APPLY_COUPON", "code": "SAVE20" }))
            .await
            .unwrap();
        assert_eq!(
            reply,
            json!({ "success": false, "applied": false, "copied": false, "error": ERR_COPY_FAILED })
        );
    }

    #[tokio::test]
    async fn test_unknown_type_is_rejected_without_side_effects() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let page = checkout_page(r#"<body><input id="coupon"></body>"#);
        let mut agent = ContentAgent::new(page, clipboard.clone());
        agent.initialize(Arc::new(StaticCatalog::demo())).await;

        let reply = agent
            .handle_message(json!({ "type": "APPLY_EVERYTHING", "code": "SAVE20" }))
            .await
            .unwrap();
        assert_eq!(reply, json!({ "success": false, "error": ERR_INVALID_MESSAGE_TYPE }));

        let field = agent.page().field_by_element_id("coupon").unwrap().id;
        assert_eq!(agent.page().value(field), Some(""));
        assert_eq!(clipboard.contents(), None);
        assert_eq!(agent.cache().coupons().len(), 2);
    }

    #[tokio::test]
    async fn test_signal_has_no_reply() {
        let mut agent = ContentAgent::new(checkout_page("<body></body>"), Arc::new(MemoryClipboard::new()));
        assert_eq!(agent.handle_message(json!({ "type": "CHECK_FOR_COUPON" })).await, None);
    }
}
