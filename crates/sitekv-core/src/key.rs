//! Canonical record keys.
//!
//! Every record lives under `{tenant}:{type}` (singletons) or
//! `{tenant}:{type}:{identifier}` (identified records). [`build_key`] is the
//! only place that shape is spelled out; handlers and scans go through it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between key segments.
pub const SEPARATOR: char = ':';

/// Category of stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// Site pages, many per tenant, addressed by slug.
    Page,
    /// Catalog products, many per tenant, addressed by slug.
    Product,
    /// Site navigation, one per tenant.
    Navigation,
    /// Site footer, one per tenant.
    Footer,
}

impl RecordType {
    /// Key segment for this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Product => "product",
            Self::Navigation => "navigation",
            Self::Footer => "footer",
        }
    }

    /// Human-readable name used in error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Page => "Page",
            Self::Product => "Product",
            Self::Navigation => "Navigation",
            Self::Footer => "Footer",
        }
    }

    /// Whether a tenant holds at most one record of this type.
    #[must_use]
    pub const fn is_singleton(self) -> bool {
        matches!(self, Self::Navigation | Self::Footer)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the canonical key for a record.
///
/// - no identifier: `{tenant}:{type}`
/// - identifier already starting with `{tenant}:`: the identifier, verbatim
/// - otherwise: `{tenant}:{type}:{identifier}`
///
/// ```
/// # use sitekv_core::{build_key, RecordType};
/// assert_eq!(build_key("site1", RecordType::Page, Some("about")), "site1:page:about");
/// assert_eq!(build_key("site1", RecordType::Page, Some("site1:page:about")), "site1:page:about");
/// assert_eq!(build_key("site1", RecordType::Footer, None), "site1:footer");
/// ```
#[must_use]
pub fn build_key(tenant_id: &str, record_type: RecordType, identifier: Option<&str>) -> String {
    match identifier {
        None => format!("{tenant_id}{SEPARATOR}{record_type}"),
        Some(id) if is_tenant_scoped(tenant_id, id) => id.to_owned(),
        Some(id) => format!("{tenant_id}{SEPARATOR}{record_type}{SEPARATOR}{id}"),
    }
}

/// Prefix shared by every identified record of `record_type` for a tenant.
#[must_use]
pub fn prefix_for(tenant_id: &str, record_type: RecordType) -> String {
    let mut prefix = build_key(tenant_id, record_type, None);
    prefix.push(SEPARATOR);
    prefix
}

fn is_tenant_scoped(tenant_id: &str, identifier: &str) -> bool {
    identifier
        .strip_prefix(tenant_id)
        .is_some_and(|rest| rest.starts_with(SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TYPES: [RecordType; 4] = [
        RecordType::Page,
        RecordType::Product,
        RecordType::Navigation,
        RecordType::Footer,
    ];

    #[test]
    fn identified_key_is_three_segments() {
        for tenant in ["site1", "acme", "t-42"] {
            for rt in ALL_TYPES {
                for id in ["about", "blog/first-post", "a:b"] {
                    assert_eq!(
                        build_key(tenant, rt, Some(id)),
                        format!("{tenant}:{}:{id}", rt.as_str())
                    );
                }
            }
        }
    }

    #[test]
    fn already_prefixed_identifier_is_used_verbatim() {
        for rt in ALL_TYPES {
            assert_eq!(
                build_key("site1", rt, Some("site1:page:about")),
                "site1:page:about"
            );
            assert_eq!(build_key("site1", rt, Some("site1:anything")), "site1:anything");
        }
    }

    #[test]
    fn prefix_guard_is_idempotent() {
        let once = build_key("site1", RecordType::Page, Some("about"));
        let twice = build_key("site1", RecordType::Page, Some(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn other_tenant_prefix_is_not_treated_as_scoped() {
        assert_eq!(
            build_key("site1", RecordType::Page, Some("site2:page:about")),
            "site1:page:site2:page:about"
        );
    }

    #[test]
    fn tenant_name_prefix_without_separator_is_not_scoped() {
        // "site10" starts with "site1" but is a different tenant.
        assert_eq!(
            build_key("site1", RecordType::Page, Some("site10:page:x")),
            "site1:page:site10:page:x"
        );
    }

    #[test]
    fn singleton_key_has_two_segments() {
        assert_eq!(build_key("site1", RecordType::Navigation, None), "site1:navigation");
        assert_eq!(build_key("site1", RecordType::Footer, None), "site1:footer");
    }

    #[test]
    fn prefix_ends_with_separator() {
        assert_eq!(prefix_for("site1", RecordType::Page), "site1:page:");
        assert_eq!(prefix_for("site1", RecordType::Product), "site1:product:");
    }

    #[test]
    fn singleton_flags() {
        assert!(RecordType::Navigation.is_singleton());
        assert!(RecordType::Footer.is_singleton());
        assert!(!RecordType::Page.is_singleton());
        assert!(!RecordType::Product.is_singleton());
    }
}
