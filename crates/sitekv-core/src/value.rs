//! Stored value encoding.
//!
//! Documents are written as compact JSON strings. Reads parse them back, and
//! anything that is not valid JSON comes back wrapped as `{"value": raw}` so
//! legacy or hand-edited data stays retrievable.

use serde::Serialize;
use serde_json::Value;

use crate::error::RecordError;

/// Serialize a document for storage.
///
/// # Errors
///
/// Returns [`RecordError::Serialization`] if the document cannot be encoded.
pub fn encode<T: Serialize + ?Sized>(document: &T) -> Result<String, RecordError> {
    serde_json::to_string(document).map_err(|e| RecordError::Serialization {
        reason: e.to_string(),
    })
}

/// Parse a stored value, falling back to `{"value": raw}` on malformed JSON.
#[must_use]
pub fn decode(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "stored value is not JSON, returning raw string");
        serde_json::json!({ "value": raw })
    })
}

/// One entry of a prefix listing: the key and its raw stored string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedRecord {
    pub key: String,
    pub value: String,
}

/// A page together with its tenant's navigation and footer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bundle {
    pub page: Value,
    pub navigation: Option<Value>,
    pub footer: Option<Value>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn decode_valid_json() {
        assert_eq!(decode(r#"{"title":"About"}"#), json!({"title": "About"}));
        assert_eq!(decode("[1,2]"), json!([1, 2]));
        assert_eq!(decode("\"plain\""), json!("plain"));
    }

    #[test]
    fn decode_malformed_falls_back_to_raw() {
        assert_eq!(decode("not json{"), json!({"value": "not json{"}));
        assert_eq!(decode(""), json!({"value": ""}));
    }

    #[test]
    fn encode_is_compact() {
        let doc = json!({"title": "About", "blocks": [1, 2]});
        let raw = encode(&doc).unwrap();
        assert!(!raw.contains(' '));
        assert_eq!(decode(&raw), doc);
    }

    #[test]
    fn bundle_serializes_missing_parts_as_null() {
        let bundle = Bundle {
            page: json!({"title": "Home"}),
            navigation: None,
            footer: None,
        };
        assert_eq!(
            serde_json::to_value(&bundle).unwrap(),
            json!({"page": {"title": "Home"}, "navigation": null, "footer": null})
        );
    }
}
