//! Manifest data structures for the CouponFinder extension

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const EXTENSION_NAME: &str = "CouponFinder";
pub const EXTENSION_DESCRIPTION: &str = "Automatically finds and applies coupon codes while shopping";
pub const EXTENSION_VERSION: &str = "1.0.0";

pub const PERMISSION_ACTIVE_TAB: &str = "activeTab";
pub const PERMISSION_CLIPBOARD_WRITE: &str = "clipboardWrite";
pub const PERMISSION_SCRIPTING: &str = "scripting";
pub const ALL_HOSTS: &str = "*://*/*";
pub const ALL_URLS: &str = "<all_urls>";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub manifest_version: u8,
    pub name: String,
    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,

    #[serde(default)]
    pub permissions: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host_permissions: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content_scripts: Vec<ContentScript>,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Background {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_worker: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scripts: Option<Vec<String>>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_popup: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentScript {
    pub matches: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub js: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_about_blank: Option<bool>,
}

impl Manifest {
    /// The manifest shipped with the extension: background worker, a content
    /// script on every page, and the popup.
    pub fn coupon_finder() -> Self {
        Self {
            manifest_version: 3,
            name: EXTENSION_NAME.to_string(),
            version: EXTENSION_VERSION.to_string(),
            description: Some(EXTENSION_DESCRIPTION.to_string()),
            background: Some(Background {
                service_worker: Some("background.js".to_string()),
                scripts: None,
                type_: Some("module".to_string()),
            }),
            action: Some(Action {
                default_popup: Some("popup.html".to_string()),
                default_title: Some(EXTENSION_NAME.to_string()),
            }),
            permissions: vec![
                PERMISSION_ACTIVE_TAB.to_string(),
                PERMISSION_CLIPBOARD_WRITE.to_string(),
                PERMISSION_SCRIPTING.to_string(),
            ],
            host_permissions: vec![ALL_HOSTS.to_string()],
            content_scripts: vec![ContentScript {
                matches: vec![ALL_URLS.to_string()],
                js: vec!["content-scripts/content.js".to_string()],
                run_at: None,
                match_about_blank: Some(false),
            }],
            extra: HashMap::new(),
        }
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Whether a background context is declared to receive tab events.
    pub fn has_background(&self) -> bool {
        self.background.as_ref().map_or(false, |b| {
            b.service_worker.is_some() || b.scripts.as_ref().map_or(false, |s| !s.is_empty())
        })
    }
}
