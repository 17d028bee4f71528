//! Document profile
//!
//! Capability record resolved once per document at construction time.
//! Name-comparison rules and collection boundary behavior live here so
//! query specs, classifiers and collection kinds consult one record
//! instead of branching on a version flag at every call site.

use serde::{Deserialize, Serialize};

/// How tag and attribute names compare in this document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeMode {
    /// Markup documents: names compare ASCII-case-insensitively
    Markup,
    /// Strict documents: names compare exactly
    Strict,
}

/// Per-document capability record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Name comparison mode
    pub mode: TreeMode,
    /// Attribute names that compare case-sensitively even in markup mode
    pub case_sensitive_attrs: Vec<String>,
    /// Indexed reads outside the bounds of a mutable collection yield an
    /// explicit null marker instead of an absent value
    pub item_null_when_outside: bool,
    /// Structural remove with a negative index is silently ignored
    /// instead of rejected
    pub remove_ignores_negative_index: bool,
    /// Structural remove past the end is silently ignored
    pub remove_ignores_out_of_range: bool,
}

impl Profile {
    /// Markup-mode profile with the boundary behavior most hosts expect
    pub fn markup() -> Self {
        Self {
            mode: TreeMode::Markup,
            case_sensitive_attrs: Vec::new(),
            item_null_when_outside: false,
            remove_ignores_negative_index: true,
            remove_ignores_out_of_range: true,
        }
    }

    /// Strict-mode profile: exact name comparison, strict boundaries
    pub fn strict() -> Self {
        Self {
            mode: TreeMode::Strict,
            case_sensitive_attrs: Vec::new(),
            item_null_when_outside: false,
            remove_ignores_negative_index: false,
            remove_ignores_out_of_range: false,
        }
    }

    /// Compare two tag names under this profile's mode
    #[inline]
    pub fn tag_eq(&self, a: &str, b: &str) -> bool {
        match self.mode {
            TreeMode::Markup => a.eq_ignore_ascii_case(b),
            TreeMode::Strict => a == b,
        }
    }

    /// Normalized form of a tag name for storage in a query spec
    pub fn normalize_tag(&self, tag: &str) -> String {
        match self.mode {
            TreeMode::Markup => tag.to_ascii_lowercase(),
            TreeMode::Strict => tag.to_string(),
        }
    }

    /// Compare two attribute names.
    ///
    /// The rule is per-attribute: names listed in `case_sensitive_attrs`
    /// compare exactly even when the document mode is case-insensitive.
    pub fn attr_name_eq(&self, a: &str, b: &str) -> bool {
        match self.mode {
            TreeMode::Strict => a == b,
            TreeMode::Markup => {
                if self.is_case_sensitive_attr(a) || self.is_case_sensitive_attr(b) {
                    a == b
                } else {
                    a.eq_ignore_ascii_case(b)
                }
            }
        }
    }

    fn is_case_sensitive_attr(&self, name: &str) -> bool {
        self.case_sensitive_attrs.iter().any(|n| n == name)
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::markup()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_tag_case() {
        let p = Profile::markup();
        assert!(p.tag_eq("DIV", "div"));
        assert_eq!(p.normalize_tag("SPAN"), "span");
    }

    #[test]
    fn test_strict_tag_case() {
        let p = Profile::strict();
        assert!(!p.tag_eq("DIV", "div"));
        assert_eq!(p.normalize_tag("SPAN"), "SPAN");
    }

    #[test]
    fn test_per_attribute_case_rule() {
        let mut p = Profile::markup();
        p.case_sensitive_attrs.push("data-key".to_string());

        assert!(p.attr_name_eq("ID", "id"));
        assert!(!p.attr_name_eq("DATA-KEY", "data-key"));
        assert!(p.attr_name_eq("data-key", "data-key"));
    }

    #[test]
    fn test_default_is_markup() {
        assert_eq!(Profile::default(), Profile::markup());
    }
}
