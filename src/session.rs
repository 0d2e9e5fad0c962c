//! One shopping visit, end to end
//!
//! Wires a [`BrowserRuntime`] to the three agents the way the browser would:
//! the background agent listens to host events, a content agent is injected
//! into the visited tab, and the popup is opened once the coupon lookup has
//! settled.

use crate::agents::{BackgroundAgent, ContentAgent, Notice, PopupController, PopupState};
use crate::config::Config;
use crate::host::{BrowserRuntime, Clipboard, MemoryClipboard};
use crate::models::{Coupon, FetchStatus};
use crate::page::{checkout_signal, find_coupon_field, CheckoutSignal, HtmlPage, InputField};
use crate::provider::CouponProvider;
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;

/// The page being visited.
#[derive(Debug, Clone)]
pub struct Visit {
    pub url: String,
    pub html: String,
}

impl Visit {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub deny_clipboard: bool,
}

/// Which coupon the user clicks in the popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponChoice {
    First,
    Code(String),
    Nothing,
}

impl CouponChoice {
    pub fn pick(&self, coupons: &[Coupon]) -> Option<String> {
        match self {
            CouponChoice::First => coupons.first().map(|c| c.code.clone()),
            CouponChoice::Code(code) => Some(code.clone()),
            CouponChoice::Nothing => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub signal: Option<CheckoutSignal>,
    pub fetch: FetchStatus,
    /// Popup state right after it opened.
    pub popup: PopupState,
    pub selected: Option<String>,
    pub notice: Option<Notice>,
    /// The coupon field and its value once the content agent detached.
    pub field: Option<(InputField, String)>,
    pub clipboard: Option<String>,
}

/// Run a visit with the provider and timeout from `config`.
pub async fn run_session<F>(
    config: &Config,
    visit: &Visit,
    options: &SessionOptions,
    choose: F,
) -> Result<SessionOutcome>
where
    F: FnOnce(&[Coupon]) -> Option<String>,
{
    let provider = config.build_provider()?;
    run_session_with(provider, config.request_timeout(), visit, options, choose).await
}

pub async fn run_session_with<F>(
    provider: Arc<dyn CouponProvider>,
    request_timeout: Option<std::time::Duration>,
    visit: &Visit,
    options: &SessionOptions,
    choose: F,
) -> Result<SessionOutcome>
where
    F: FnOnce(&[Coupon]) -> Option<String>,
{
    let page = HtmlPage::parse(&visit.url, &visit.html)
        .with_context(|| format!("Failed to load page {}", visit.url))?;
    let signal = checkout_signal(&page);

    let runtime = BrowserRuntime::new().with_request_timeout(request_timeout);
    let events = runtime.subscribe();
    let background = tokio::spawn(BackgroundAgent::new(runtime.clone()).run(events));
    runtime.install();

    let tab = runtime.open_tab(visit.url.clone());
    let mailbox = runtime
        .attach_content_agent(tab)
        .ok_or_else(|| anyhow!("tab {} closed before the content agent attached", tab))?;

    let clipboard = Arc::new(if options.deny_clipboard {
        MemoryClipboard::denied()
    } else {
        MemoryClipboard::new()
    });
    let agent_clipboard: Arc<dyn Clipboard> = clipboard.clone();
    let mut content = ContentAgent::new(page, agent_clipboard).spawn(provider, mailbox);

    runtime.complete_navigation(tab);
    let fetch = content.settled().await;
    tracing::debug!(%tab, %fetch, "coupon lookup settled");

    let mut popup = PopupController::new(runtime.clone());
    let opened = popup.open().await.clone();

    let notice = match &opened {
        PopupState::Ready { coupons, .. } => match choose(coupons) {
            Some(code) => Some(popup.apply(&code).await),
            None => None,
        },
        _ => None,
    };

    runtime.close_tab(tab);
    background.abort();
    let page = content.join().await.context("content agent panicked")?;

    let field = find_coupon_field(&page).map(|field| {
        let value = page.value(field.id).unwrap_or_default().to_string();
        (field, value)
    });

    Ok(SessionOutcome {
        signal,
        fetch,
        popup: opened,
        selected: popup.selected().map(str::to_string),
        notice,
        field,
        clipboard: clipboard.contents(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticCatalog;

    #[tokio::test]
    async fn test_non_checkout_visit_shows_empty_popup() {
        let visit = Visit::new("https://shop.example.com/about", "<body>Our story</body>");
        let outcome = run_session_with(
            Arc::new(StaticCatalog::demo()),
            None,
            &visit,
            &SessionOptions::default(),
            |_| panic!("nothing to choose from"),
        )
        .await
        .unwrap();

        assert_eq!(outcome.signal, None);
        assert_eq!(outcome.fetch, FetchStatus::Skipped);
        assert_eq!(outcome.popup, PopupState::Empty);
        assert!(outcome.notice.is_none());
    }

    #[tokio::test]
    async fn test_choice_nothing_leaves_field_empty() {
        let visit = Visit::new("https://shop.example.com/cart", r#"<body><input name="coupon"></body>"#);
        let outcome = run_session_with(
            Arc::new(StaticCatalog::demo()),
            None,
            &visit,
            &SessionOptions::default(),
            |coupons| CouponChoice::Nothing.pick(coupons),
        )
        .await
        .unwrap();

        assert_eq!(outcome.signal, Some(CheckoutSignal::UrlKeyword("cart")));
        assert!(outcome.selected.is_none());
        let (_, value) = outcome.field.unwrap();
        assert_eq!(value, "");
    }

    #[test]
    fn test_coupon_choice() {
        let coupons = crate::provider::demo_coupons();
        assert_eq!(CouponChoice::First.pick(&coupons).as_deref(), Some("SAVE20"));
        assert_eq!(CouponChoice::Code("X".into()).pick(&coupons).as_deref(), Some("X"));
        assert_eq!(CouponChoice::Nothing.pick(&coupons), None);
        assert_eq!(CouponChoice::First.pick(&[]), None);
    }
}
