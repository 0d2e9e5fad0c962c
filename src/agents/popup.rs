//! Popup controller: lives while the extension popup is open

use crate::host::{request, MessagingError, TabId, TabMessenger};
use crate::models::{
    ApplyCouponResponse, Coupon, CouponsFoundResponse, Request, ERR_APPLY_FAILED, ERR_COMMUNICATION,
    ERR_FETCH_FAILED,
};

pub const COPIED_NOTICE: &str = "Could not find coupon field. Code copied to clipboard!";

/// What the popup shows, in precedence order.
#[derive(Debug, Clone, PartialEq)]
pub enum PopupState {
    Loading,
    Failed(String),
    Empty,
    Ready {
        coupons: Vec<Coupon>,
        notice: Option<Notice>,
    },
}

/// Outcome banner after the user picks a coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Applied(String),
    Copied(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Applied(code) => format!("Coupon {} applied", code),
            Notice::Copied(_) => COPIED_NOTICE.to_string(),
            Notice::Error(message) => message.clone(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

pub struct PopupController<M> {
    messenger: M,
    state: PopupState,
    selected: Option<String>,
}

impl<M: TabMessenger> PopupController<M> {
    pub fn new(messenger: M) -> Self {
        Self {
            messenger,
            state: PopupState::Loading,
            selected: None,
        }
    }

    pub fn state(&self) -> &PopupState {
        &self.state
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    async fn target_tab(&self) -> Result<TabId, MessagingError> {
        self.messenger.active_tab().await.ok_or(MessagingError::NoActiveTab)
    }

    /// Ask the active tab's content agent for its coupons.
    pub async fn open(&mut self) -> &PopupState {
        self.state = PopupState::Loading;

        let response = match self.target_tab().await {
            Ok(tab) => request::<M, CouponsFoundResponse>(&self.messenger, tab, &Request::CouponsFound).await,
            Err(err) => Err(err),
        };

        self.state = match response {
            Ok(response) if !response.success => {
                PopupState::Failed(response.error.unwrap_or_else(|| ERR_FETCH_FAILED.to_string()))
            }
            Ok(response) if response.coupons.is_empty() => PopupState::Empty,
            Ok(response) => PopupState::Ready {
                coupons: response.coupons,
                notice: None,
            },
            Err(err) => {
                tracing::warn!(error = %err, "popup could not reach the page");
                PopupState::Failed(ERR_COMMUNICATION.to_string())
            }
        };
        &self.state
    }

    /// Ask the content agent to apply `code` and record the outcome.
    pub async fn apply(&mut self, code: &str) -> Notice {
        self.selected = Some(code.to_string());

        let response = match self.target_tab().await {
            Ok(tab) => request::<M, ApplyCouponResponse>(&self.messenger, tab, &Request::apply(code)).await,
            Err(err) => Err(err),
        };

        let notice = match response {
            Ok(response) if !response.success => {
                Notice::Error(response.error.unwrap_or_else(|| ERR_APPLY_FAILED.to_string()))
            }
            Ok(response) if response.copied => Notice::Copied(code.to_string()),
            Ok(_) => Notice::Applied(code.to_string()),
            Err(err) => {
                tracing::warn!(error = %err, "popup could not reach the page");
                Notice::Error(ERR_COMMUNICATION.to_string())
            }
        };

        if let PopupState::Ready { notice: slot, .. } = &mut self.state {
            *slot = Some(notice.clone());
        }
        notice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{BrowserRuntime, Envelope};
    use serde_json::{json, Value};
    use tokio::sync::mpsc::UnboundedReceiver;

    /// Answer every request with a fixed reply.
    fn respond_with(mut mailbox: UnboundedReceiver<Envelope>, reply: Value) {
        tokio::spawn(async move {
            while let Some(envelope) = mailbox.recv().await {
                if let Some(tx) = envelope.reply {
                    let _ = tx.send(reply.clone());
                }
            }
        });
    }

    fn runtime_with_reply(reply: Value) -> BrowserRuntime {
        let runtime = BrowserRuntime::new();
        let tab = runtime.open_tab("https://shop.example.com/checkout");
        respond_with(runtime.attach_content_agent(tab).unwrap(), reply);
        runtime
    }

    #[tokio::test]
    async fn test_open_lists_coupons() {
        let runtime = runtime_with_reply(json!({
            "success": true,
            "coupons": [
                { "code": "SAVE20", "description": "20% off", "success_rate": 85, "last_tested": "2024-12-28" }
            ]
        }));
        let mut popup = PopupController::new(runtime);

        match popup.open().await {
            PopupState::Ready { coupons, notice } => {
                assert_eq!(coupons.len(), 1);
                assert_eq!(coupons[0].code, "SAVE20");
                assert!(notice.is_none());
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_open_empty_and_failed() {
        let mut popup = PopupController::new(runtime_with_reply(json!({ "success": true, "coupons": [] })));
        assert_eq!(popup.open().await, &PopupState::Empty);

        let mut popup = PopupController::new(runtime_with_reply(json!({ "success": false, "coupons": [] })));
        assert_eq!(popup.open().await, &PopupState::Failed(ERR_FETCH_FAILED.to_string()));
    }

    #[tokio::test]
    async fn test_open_without_content_agent() {
        let runtime = BrowserRuntime::new();
        runtime.open_tab("chrome://extensions");
        let mut popup = PopupController::new(runtime);

        assert_eq!(popup.open().await, &PopupState::Failed(ERR_COMMUNICATION.to_string()));
    }

    #[tokio::test]
    async fn test_open_without_active_tab() {
        let mut popup = PopupController::new(BrowserRuntime::new());
        assert_eq!(popup.open().await, &PopupState::Failed(ERR_COMMUNICATION.to_string()));
    }

    #[tokio::test]
    async fn test_apply_notices() {
        let mut popup = PopupController::new(runtime_with_reply(json!({
            "success": true, "applied": false, "copied": true
        })));
        let notice = popup.apply("FREESHIP").await;
        assert_eq!(notice, Notice::Copied("FREESHIP".to_string()));
        assert_eq!(notice.message(), COPIED_NOTICE);
        assert_eq!(popup.selected(), Some("FREESHIP"));

        let mut popup = PopupController::new(runtime_with_reply(json!({
            "success": false, "applied": false, "copied": false, "error": "Failed to copy to clipboard"
        })));
        let notice = popup.apply("FREESHIP").await;
        assert_eq!(notice, Notice::Error("Failed to copy to clipboard".to_string()));
        assert!(notice.is_error());
    }
}
