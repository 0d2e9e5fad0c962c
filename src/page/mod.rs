//! Page model and page heuristics
//!
//! The content agent sees the host page only through [`Page`]: the URL, the
//! visible body text, the `<input>` elements in document order, and two
//! mutators used to inject a coupon code.

pub mod detection;
pub mod document;
pub mod field;

pub use detection::{checkout_signal, classify, detect_checkout_page, is_checkout_navigation, CheckoutSignal};
pub use document::HtmlPage;
pub use field::{find_coupon_field, match_coupon_field, FieldAttribute, FieldSelector, COUPON_FIELD_SELECTORS};

use serde::Serialize;
use thiserror::Error;

/// Position of an `<input>` element in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FieldId(pub usize);

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "input#{}", self.0)
    }
}

/// Snapshot of an `<input>` element's identifying attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputField {
    pub id: FieldId,
    pub name: Option<String>,
    pub element_id: Option<String>,
    pub placeholder: Option<String>,
}

impl InputField {
    pub fn attribute(&self, attribute: FieldAttribute) -> Option<&str> {
        match attribute {
            FieldAttribute::Name => self.name.as_deref(),
            FieldAttribute::Id => self.element_id.as_deref(),
            FieldAttribute::Placeholder => self.placeholder.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Input,
}

/// Synthetic DOM event dispatched after a programmatic value change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldEvent {
    pub kind: EventKind,
    pub bubbles: bool,
}

impl FieldEvent {
    /// The `input` event page scripts listen for; bubbles so delegated
    /// listeners on ancestors see it.
    pub fn input() -> Self {
        Self {
            kind: EventKind::Input,
            bubbles: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("invalid page URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{0} is not attached to the document")]
    UnknownField(FieldId),

    #[error("{0} rejected the update: {1}")]
    Rejected(FieldId, String),
}

/// The document a content agent runs in.
pub trait Page: Send {
    /// Full page URL.
    fn href(&self) -> &str;

    fn hostname(&self) -> &str;

    /// Visible text of the body.
    fn body_text(&self) -> String;

    /// All `<input>` elements, in document order.
    fn input_fields(&self) -> Vec<InputField>;

    fn set_field_value(&mut self, field: FieldId, value: &str) -> Result<(), PageError>;

    fn dispatch_event(&mut self, field: FieldId, event: FieldEvent) -> Result<(), PageError>;
}
