//! Host capabilities the three agents depend on

use crate::models::{Manifest, PERMISSION_ACTIVE_TAB, PERMISSION_CLIPBOARD_WRITE, PERMISSION_SCRIPTING};
use crate::utils::helpers::{is_match_pattern, matches_all_hosts};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Message the active tab from the popup.
    ActiveTab,
    /// Clipboard fallback when no coupon field exists.
    ClipboardWrite,
    /// Content script injection.
    Scripting,
    /// Run on every site.
    AllHosts,
    /// A background context to observe tab navigation.
    TabNavigation,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::ActiveTab,
        Capability::ClipboardWrite,
        Capability::Scripting,
        Capability::AllHosts,
        Capability::TabNavigation,
    ];

    pub fn is_granted(self, manifest: &Manifest) -> bool {
        match self {
            Capability::ActiveTab => manifest.has_permission(PERMISSION_ACTIVE_TAB),
            Capability::ClipboardWrite => manifest.has_permission(PERMISSION_CLIPBOARD_WRITE),
            Capability::Scripting => manifest.has_permission(PERMISSION_SCRIPTING),
            // MV2-style manifests list host patterns among the permissions.
            Capability::AllHosts => manifest
                .host_permissions
                .iter()
                .chain(manifest.permissions.iter().filter(|p| is_match_pattern(p)))
                .any(|p| matches_all_hosts(p)),
            Capability::TabNavigation => manifest.has_background(),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::ActiveTab => PERMISSION_ACTIVE_TAB,
            Capability::ClipboardWrite => PERMISSION_CLIPBOARD_WRITE,
            Capability::Scripting => PERMISSION_SCRIPTING,
            Capability::AllHosts => "host access to all sites",
            Capability::TabNavigation => "background context",
        };
        f.write_str(name)
    }
}

pub fn missing_capabilities(manifest: &Manifest) -> Vec<Capability> {
    Capability::ALL
        .iter()
        .copied()
        .filter(|c| !c.is_granted(manifest))
        .collect()
}
