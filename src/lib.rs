//! CouponFinder
//!
//! Browser-extension logic for finding and applying coupon codes on
//! checkout pages: page heuristics, the coupon provider client and the
//! three cooperating agents (content, background, popup) that talk through
//! an extension host.

pub mod agents;
pub mod config;
pub mod host;
pub mod models;
pub mod page;
pub mod parser;
pub mod provider;
pub mod session;
pub mod utils;
pub mod validator;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use agents::{BackgroundAgent, ContentAgent, ContentHandle, Notice, PopupController, PopupState};
pub use config::{Config, ProviderConfig};
pub use host::{BrowserRuntime, TabId, TabMessenger};
pub use models::{Coupon, Manifest, Request, Response, Signal};
pub use page::{detect_checkout_page, find_coupon_field, is_checkout_navigation, HtmlPage, Page};
pub use provider::{CouponProvider, StaticCatalog};
#[cfg(not(target_arch = "wasm32"))]
pub use provider::HttpCouponProvider;
pub use session::{run_session, CouponChoice, SessionOptions, SessionOutcome, Visit};
