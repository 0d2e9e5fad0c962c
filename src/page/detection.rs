//! Checkout page detection

use super::Page;
use lazy_static::lazy_static;
use regex::Regex;

/// URL substrings that mark a checkout flow.
pub const URL_KEYWORDS: &[&str] = &["checkout", "cart", "basket", "order", "payment"];

/// Body text phrases that mark a checkout flow.
pub const CONTENT_PHRASES: &[&str] = &[
    "shipping address",
    "billing address",
    "payment method",
    "promo code",
    "coupon code",
];

lazy_static! {
    // Narrower than URL_KEYWORDS: the background worker only pings content
    // scripts for these.
    static ref CHECKOUT_NAVIGATION_PATTERN: Regex = Regex::new(r"(?i)checkout|cart|payment").unwrap();
}

/// What made a page look like a checkout page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutSignal {
    UrlKeyword(&'static str),
    ContentPhrase(&'static str),
}

impl std::fmt::Display for CheckoutSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutSignal::UrlKeyword(keyword) => write!(f, "URL contains \"{}\"", keyword),
            CheckoutSignal::ContentPhrase(phrase) => write!(f, "page text contains \"{}\"", phrase),
        }
    }
}

pub fn url_keyword(url: &str) -> Option<&'static str> {
    let url = url.to_lowercase();
    URL_KEYWORDS.iter().copied().find(|keyword| url.contains(keyword))
}

pub fn content_phrase(text: &str) -> Option<&'static str> {
    let text = text.to_lowercase();
    CONTENT_PHRASES.iter().copied().find(|phrase| text.contains(phrase))
}

/// Classify a URL and already-rendered body text.
pub fn classify(url: &str, body_text: &str) -> Option<CheckoutSignal> {
    url_keyword(url)
        .map(CheckoutSignal::UrlKeyword)
        .or_else(|| content_phrase(body_text).map(CheckoutSignal::ContentPhrase))
}

/// Classify a page. The URL is checked first; body text is only read when
/// the URL has no keyword.
pub fn checkout_signal<P: Page + ?Sized>(page: &P) -> Option<CheckoutSignal> {
    if let Some(keyword) = url_keyword(page.href()) {
        return Some(CheckoutSignal::UrlKeyword(keyword));
    }
    content_phrase(&page.body_text()).map(CheckoutSignal::ContentPhrase)
}

/// True if the page looks like a cart, checkout or payment step.
pub fn detect_checkout_page<P: Page + ?Sized>(page: &P) -> bool {
    checkout_signal(page).is_some()
}

/// Background worker filter for completed tab navigations.
pub fn is_checkout_navigation(url: &str) -> bool {
    CHECKOUT_NAVIGATION_PATTERN.is_match(url)
}
