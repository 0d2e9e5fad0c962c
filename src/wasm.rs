//! WebAssembly bindings for the page heuristics and the manifest

use crate::models::Manifest;
use crate::page::{checkout_signal, classify, match_coupon_field, HtmlPage, Page};
use wasm_bindgen::prelude::*;

macro_rules! console_log {
    ($($t:tt)*) => (web_sys::console::log_1(&JsValue::from_str(&format_args!($($t)*).to_string())))
}

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Checkout verdict from a URL and the page's rendered text.
#[wasm_bindgen]
pub fn detect_checkout(url: &str, body_text: &str) -> bool {
    let signal = classify(url, body_text);
    if let Some(signal) = signal {
        console_log!("[CouponFinder] checkout page: {}", signal);
    }
    signal.is_some()
}

/// Whether a completed navigation to `url` should ping the content script.
#[wasm_bindgen]
pub fn is_checkout_navigation(url: &str) -> bool {
    crate::page::is_checkout_navigation(url)
}

/// The coupon field of an HTML document as JSON, or `undefined` when the
/// page has none.
#[wasm_bindgen]
pub fn find_coupon_field_html(url: &str, html: &str) -> Result<Option<String>, JsValue> {
    let page = HtmlPage::parse(url, html).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let fields = page.input_fields();
    let found = match match_coupon_field(&fields) {
        Some(found) => found,
        None => {
            console_log!("[CouponFinder] no coupon field on {}", page.href());
            return Ok(None);
        }
    };

    let (field, selector) = found;
    console_log!("[CouponFinder] {} matched {}", field.id, selector);
    let mut value = serde_json::to_value(field).map_err(|e| JsValue::from_str(&e.to_string()))?;
    value["selector"] = serde_json::Value::String(selector.to_string());
    value["checkout"] = serde_json::Value::Bool(checkout_signal(&page).is_some());
    Ok(Some(value.to_string()))
}

/// The extension's manifest.json.
#[wasm_bindgen]
pub fn coupon_finder_manifest() -> Result<String, JsValue> {
    serde_json::to_string_pretty(&Manifest::coupon_finder())
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize manifest: {}", e)))
}
