//! End-to-end visits: host, background, content agent and popup together.

use async_trait::async_trait;
use coupon_finder::host::MemoryClipboard;
use coupon_finder::models::{FetchStatus, ERR_COMMUNICATION, ERR_COPY_FAILED, ERR_FETCH_FAILED};
use coupon_finder::page::CheckoutSignal;
use coupon_finder::provider::ProviderError;
use coupon_finder::session::run_session_with;
use coupon_finder::{
    BrowserRuntime, ContentAgent, Coupon, CouponChoice, CouponProvider, HtmlPage, Notice, PopupController,
    PopupState, SessionOptions, StaticCatalog, Visit,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

const CHECKOUT_HTML: &str = r#"
<html>
  <body>
    <h1>Checkout</h1>
    <input name="email" placeholder="Email">
    <input id="promo-code" placeholder="Have a code?">
    <button>Apply</button>
  </body>
</html>"#;

/// A lookup that never completes.
struct Stalled;

#[async_trait]
impl CouponProvider for Stalled {
    async fn fetch_coupons(&self, _domain: &str) -> Result<Vec<Coupon>, ProviderError> {
        futures::future::pending().await
    }
}

struct Offline;

#[async_trait]
impl CouponProvider for Offline {
    async fn fetch_coupons(&self, _domain: &str) -> Result<Vec<Coupon>, ProviderError> {
        Err(ProviderError::Status(503))
    }
}

fn codes(state: &PopupState) -> Vec<&str> {
    match state {
        PopupState::Ready { coupons, .. } => coupons.iter().map(|c| c.code.as_str()).collect(),
        _ => Vec::new(),
    }
}

#[tokio::test]
async fn test_checkout_visit_applies_chosen_coupon() {
    let visit = Visit::new("https://shop.example.com/checkout", CHECKOUT_HTML);
    let outcome = run_session_with(
        Arc::new(StaticCatalog::demo()),
        Some(Duration::from_secs(5)),
        &visit,
        &SessionOptions::default(),
        |coupons| CouponChoice::Code("FREESHIP".to_string()).pick(coupons),
    )
    .await
    .unwrap();

    assert_eq!(outcome.signal, Some(CheckoutSignal::UrlKeyword("checkout")));
    assert_eq!(outcome.fetch, FetchStatus::Ready);
    assert_eq!(codes(&outcome.popup), vec!["SAVE20", "FREESHIP"]);
    assert_eq!(outcome.selected.as_deref(), Some("FREESHIP"));
    assert_eq!(outcome.notice, Some(Notice::Applied("FREESHIP".to_string())));

    let (field, value) = outcome.field.unwrap();
    assert_eq!(field.element_id.as_deref(), Some("promo-code"));
    assert_eq!(value, "FREESHIP");
    assert_eq!(outcome.clipboard, None);
}

#[tokio::test]
async fn test_body_text_detection_triggers_lookup() {
    let visit = Visit::new(
        "https://shop.example.com/step/2",
        r#"<body><p>Choose a payment method</p><input name="promoCode"></body>"#,
    );
    let outcome = run_session_with(
        Arc::new(StaticCatalog::demo()),
        None,
        &visit,
        &SessionOptions::default(),
        |coupons| CouponChoice::First.pick(coupons),
    )
    .await
    .unwrap();

    assert_eq!(outcome.signal, Some(CheckoutSignal::ContentPhrase("payment method")));
    assert_eq!(outcome.notice, Some(Notice::Applied("SAVE20".to_string())));
    assert_eq!(outcome.field.unwrap().1, "SAVE20");
}

#[tokio::test]
async fn test_clipboard_fallback_without_field() {
    let visit = Visit::new("https://shop.example.com/cart", r#"<body><input name="email"></body>"#);
    let outcome = run_session_with(
        Arc::new(StaticCatalog::demo()),
        None,
        &visit,
        &SessionOptions::default(),
        |coupons| CouponChoice::First.pick(coupons),
    )
    .await
    .unwrap();

    assert_eq!(outcome.notice, Some(Notice::Copied("SAVE20".to_string())));
    assert_eq!(outcome.clipboard.as_deref(), Some("SAVE20"));
    assert!(outcome.field.is_none());
}

#[tokio::test]
async fn test_clipboard_denied() {
    let visit = Visit::new("https://shop.example.com/cart", "<body></body>");
    let outcome = run_session_with(
        Arc::new(StaticCatalog::demo()),
        None,
        &visit,
        &SessionOptions { deny_clipboard: true },
        |coupons| CouponChoice::First.pick(coupons),
    )
    .await
    .unwrap();

    assert_eq!(outcome.notice, Some(Notice::Error(ERR_COPY_FAILED.to_string())));
    assert_eq!(outcome.clipboard, None);
}

#[tokio::test]
async fn test_failed_lookup_shows_error() {
    let visit = Visit::new("https://shop.example.com/checkout", CHECKOUT_HTML);
    let outcome = run_session_with(
        Arc::new(Offline),
        None,
        &visit,
        &SessionOptions::default(),
        |_| panic!("no coupons to choose"),
    )
    .await
    .unwrap();

    assert_eq!(outcome.fetch, FetchStatus::Failed);
    assert_eq!(outcome.popup, PopupState::Failed(ERR_FETCH_FAILED.to_string()));
}

#[tokio::test]
async fn test_invalid_url_is_an_error() {
    let visit = Visit::new("not a url", "<body></body>");
    let result = run_session_with(
        Arc::new(StaticCatalog::demo()),
        None,
        &visit,
        &SessionOptions::default(),
        |_| None,
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_popup_before_lookup_settles_sees_empty_list() {
    let runtime = BrowserRuntime::new();
    let tab = runtime.open_tab("https://shop.example.com/checkout");
    let mailbox = runtime.attach_content_agent(tab).unwrap();

    let page = HtmlPage::parse("https://shop.example.com/checkout", CHECKOUT_HTML).unwrap();
    let handle = ContentAgent::new(page, Arc::new(MemoryClipboard::new())).spawn(Arc::new(Stalled), mailbox);

    let mut popup = PopupController::new(runtime.clone());
    assert_eq!(popup.open().await, &PopupState::Empty);
    assert_eq!(handle.status(), FetchStatus::Pending);

    // Applying still works while the lookup is outstanding.
    assert_eq!(popup.apply("LATE10").await, Notice::Applied("LATE10".to_string()));

    runtime.close_tab(tab);
    let page = handle.join().await.unwrap();
    let field = page.field_by_element_id("promo-code").unwrap().id;
    assert_eq!(page.value(field), Some("LATE10"));
}

#[tokio::test(start_paused = true)]
async fn test_unresponsive_page_times_out() {
    let runtime = BrowserRuntime::new().with_request_timeout(Some(Duration::from_secs(5)));
    let tab = runtime.open_tab("https://shop.example.com/checkout");
    // Attached but never served.
    let _mailbox = runtime.attach_content_agent(tab).unwrap();

    let mut popup = PopupController::new(runtime);
    assert_eq!(popup.open().await, &PopupState::Failed(ERR_COMMUNICATION.to_string()));
    assert_eq!(popup.apply("SAVE20").await, Notice::Error(ERR_COMMUNICATION.to_string()));
}
