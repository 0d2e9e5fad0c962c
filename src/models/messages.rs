//! Cross-context message protocol
//!
//! Every message is a JSON object tagged by `type`. Popup and background
//! only send; the content agent is the only responder. Requests get exactly
//! one response, signals get none.

use super::coupon::{Coupon, CouponCache};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const COUPONS_FOUND: &str = "COUPONS_FOUND";
pub const APPLY_COUPON: &str = "APPLY_COUPON";
pub const CHECK_FOR_COUPON: &str = "CHECK_FOR_COUPON";

pub const ERR_INVALID_MESSAGE_TYPE: &str = "Invalid message type";
pub const ERR_APPLY_FAILED: &str = "Failed to apply coupon";
pub const ERR_COPY_FAILED: &str = "Failed to copy to clipboard";
pub const ERR_FETCH_FAILED: &str = "Failed to fetch coupons";
pub const ERR_COMMUNICATION: &str = "Failed to communicate with the page";

/// Requests answered by the content agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    CouponsFound,
    ApplyCoupon { code: String },
}

impl Request {
    pub fn apply(code: impl Into<String>) -> Self {
        Request::ApplyCoupon { code: code.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Request::CouponsFound => COUPONS_FOUND,
            Request::ApplyCoupon { .. } => APPLY_COUPON,
        }
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// One-way notifications. Delivery is best effort and nothing is awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    CheckForCoupon,
}

impl Signal {
    pub fn kind(&self) -> &'static str {
        match self {
            Signal::CheckForCoupon => CHECK_FOR_COUPON,
        }
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Anything the content agent can receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Request(Request),
    Signal(Signal),
}

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("message has no string `type` field")]
    MissingType,

    #[error("unknown message type `{0}`")]
    UnknownType(String),

    #[error("malformed {kind} message: {source}")]
    Malformed {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl Message {
    /// Decode a raw inbound message, dispatching on its `type` field.
    pub fn from_value(value: Value) -> Result<Self, MessageError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(MessageError::MissingType)?
            .to_owned();

        match kind.as_str() {
            COUPONS_FOUND | APPLY_COUPON => {
                let kind = if kind == COUPONS_FOUND { COUPONS_FOUND } else { APPLY_COUPON };
                serde_json::from_value(value)
                    .map(Message::Request)
                    .map_err(|source| MessageError::Malformed { kind, source })
            }
            CHECK_FOR_COUPON => serde_json::from_value(value)
                .map(Message::Signal)
                .map_err(|source| MessageError::Malformed {
                    kind: CHECK_FOR_COUPON,
                    source,
                }),
            _ => Err(MessageError::UnknownType(kind)),
        }
    }
}

impl From<Request> for Message {
    fn from(request: Request) -> Self {
        Message::Request(request)
    }
}

impl From<Signal> for Message {
    fn from(signal: Signal) -> Self {
        Message::Signal(signal)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponsFoundResponse {
    pub success: bool,
    #[serde(default)]
    pub coupons: Vec<Coupon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CouponsFoundResponse {
    /// Snapshot of the cache at request time. A failed fetch is never reported
    /// as a success, whatever the cache holds.
    pub fn from_cache(cache: &CouponCache) -> Self {
        let failed = cache.failed();
        Self {
            success: !failed,
            coupons: cache.coupons().to_vec(),
            error: failed.then(|| ERR_FETCH_FAILED.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyCouponResponse {
    pub success: bool,
    #[serde(default)]
    pub applied: bool,
    #[serde(default)]
    pub copied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApplyCouponResponse {
    pub fn applied() -> Self {
        Self {
            success: true,
            applied: true,
            copied: false,
            error: None,
        }
    }

    pub fn copied() -> Self {
        Self {
            success: true,
            applied: false,
            copied: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            applied: false,
            copied: false,
            error: Some(error.into()),
        }
    }
}

/// Reply to anything that is not a recognised request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn invalid_message_type() -> Self {
        Self {
            success: false,
            error: ERR_INVALID_MESSAGE_TYPE.to_string(),
        }
    }
}

/// Outbound reply from the content agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    CouponsFound(CouponsFoundResponse),
    ApplyCoupon(ApplyCouponResponse),
    Rejected(ErrorResponse),
}

impl Response {
    pub fn success(&self) -> bool {
        match self {
            Response::CouponsFound(r) => r.success,
            Response::ApplyCoupon(r) => r.success,
            Response::Rejected(r) => r.success,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Response::CouponsFound(r) => r.error.as_deref(),
            Response::ApplyCoupon(r) => r.error.as_deref(),
            Response::Rejected(r) => Some(&r.error),
        }
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
