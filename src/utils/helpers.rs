//! Helper utility functions

/// Check if a string is a URL match pattern
pub fn is_match_pattern(s: &str) -> bool {
    s.contains("://") || s.starts_with('<') || s.starts_with('*')
}

/// Whether a host match pattern covers every site.
pub fn matches_all_hosts(pattern: &str) -> bool {
    matches!(pattern, "<all_urls>" | "*://*/*" | "http*://*/*")
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_match_pattern() {
        assert!(is_match_pattern("https://example.com/*"));
        assert!(is_match_pattern("<all_urls>"));
        assert!(is_match_pattern("*://*.example.com/*"));
        assert!(!is_match_pattern("clipboardWrite"));
        assert!(!is_match_pattern("activeTab"));
    }

    #[test]
    fn test_matches_all_hosts() {
        assert!(matches_all_hosts("*://*/*"));
        assert!(matches_all_hosts("<all_urls>"));
        assert!(!matches_all_hosts("*://*.example.com/*"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Shipping \n\t address  "), "Shipping address");
        assert_eq!(collapse_whitespace(""), "");
    }
}
