//! Raw JSON traffic between the popup and a spawned content agent.

use coupon_finder::host::{BrowserRuntime, MemoryClipboard, TabMessenger};
use coupon_finder::models::{ERR_FETCH_FAILED, ERR_INVALID_MESSAGE_TYPE};
use coupon_finder::{ContentAgent, HtmlPage, StaticCatalog};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

async fn checkout_tab(html: &str) -> (BrowserRuntime, coupon_finder::TabId) {
    let runtime = BrowserRuntime::new();
    let tab = runtime.open_tab("https://shop.example.com/checkout");
    let mailbox = runtime.attach_content_agent(tab).unwrap();
    let page = HtmlPage::parse("https://shop.example.com/checkout", html).unwrap();

    let mut handle = ContentAgent::new(page, Arc::new(MemoryClipboard::new()))
        .spawn(Arc::new(StaticCatalog::demo()), mailbox);
    handle.settled().await;
    (runtime, tab)
}

async fn send(runtime: &BrowserRuntime, tab: coupon_finder::TabId, message: Value) -> Value {
    runtime.send_message(tab, message).await.unwrap()
}

#[tokio::test]
async fn test_coupons_found_wire_shape() {
    let (runtime, tab) = checkout_tab("<body></body>").await;
    let reply = send(&runtime, tab, json!({ "type": "COUPONS_FOUND" })).await;

    assert_eq!(
        reply,
        json!({
            "success": true,
            "coupons": [
                { "code": "SAVE20", "description": "20% off your order", "success_rate": 85.0, "last_tested": "2024-12-28" },
                { "code": "FREESHIP", "description": "Free shipping on orders over $50", "success_rate": 92.0, "last_tested": "2024-12-29" }
            ]
        })
    );
}

#[tokio::test]
async fn test_apply_wire_shape() {
    let (runtime, tab) = checkout_tab(r#"<body><input name="couponCode"></body>"#).await;
    let reply = send(&runtime, tab, json!({ "type": "APPLY_COUPON", "code": "SAVE20" })).await;
    assert_eq!(reply, json!({ "success": true, "applied": true, "copied": false }));
}

#[tokio::test]
async fn test_rejections() {
    let (runtime, tab) = checkout_tab("<body></body>").await;
    let rejected = json!({ "success": false, "error": ERR_INVALID_MESSAGE_TYPE });

    assert_eq!(send(&runtime, tab, json!({ "type": "GET_COUPONS" })).await, rejected);
    assert_eq!(send(&runtime, tab, json!({ "code": "SAVE20" })).await, rejected);
    assert_eq!(send(&runtime, tab, json!({ "type": "APPLY_COUPON" })).await, rejected);
    assert_eq!(send(&runtime, tab, json!("COUPONS_FOUND")).await, rejected);

    // Still serving afterwards.
    let reply = send(&runtime, tab, json!({ "type": "COUPONS_FOUND" })).await;
    assert_eq!(reply["success"], true);
}

#[tokio::test]
async fn test_signal_then_request() {
    let (runtime, tab) = checkout_tab("<body></body>").await;
    runtime.send_signal(tab, json!({ "type": "CHECK_FOR_COUPON" })).unwrap();

    let reply = send(&runtime, tab, json!({ "type": "COUPONS_FOUND" })).await;
    assert_eq!(reply["coupons"].as_array().map(Vec::len), Some(2));
    assert_ne!(reply.get("error").and_then(Value::as_str), Some(ERR_FETCH_FAILED));
}
