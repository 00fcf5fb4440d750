//! Request identity and the `social_id` extraction rules.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Store key and query parameter for the anonymous device identifier.
pub const UDID_KEY: &str = "udid";
/// Store key and query parameter for the authenticated user identifier.
pub const SOCIAL_ID_KEY: &str = "social_id";
/// Prefix of generated device identifiers.
pub const UDID_PREFIX: &str = "udid_";

/// The identity attached to every outgoing request.
///
/// Authenticated identity always wins over the anonymous one; a request is
/// never tagged with both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Identity {
    Anonymous { udid: String },
    Authenticated { social_id: String },
}

impl Identity {
    /// Query parameter name this identity is sent under.
    pub fn param_name(&self) -> &'static str {
        match self {
            Identity::Anonymous { .. } => UDID_KEY,
            Identity::Authenticated { .. } => SOCIAL_ID_KEY,
        }
    }

    /// Identifier value sent on the wire.
    pub fn value(&self) -> &str {
        match self {
            Identity::Anonymous { udid } => udid,
            Identity::Authenticated { social_id } => social_id,
        }
    }

    /// `(name, value)` pair ready to be appended to a query string.
    pub fn query_pair(&self) -> (&'static str, &str) {
        (self.param_name(), self.value())
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated { .. })
    }
}

/// Lookup order used by [`extract_social_id`].
///
/// Each entry is a JSON pointer into the user upsert/login response.
pub const SOCIAL_ID_LOOKUP_ORDER: [&str; 4] =
    ["/social_id", "/data/social_id", "/data/id", "/id"];

/// Pull the user identifier out of an upsert/login response.
///
/// Candidates are tried in [`SOCIAL_ID_LOOKUP_ORDER`]. Strings are taken
/// as-is and integers are rendered in decimal; empty strings and any other
/// JSON type are skipped.
pub fn extract_social_id(response: &Value) -> Option<String> {
    SOCIAL_ID_LOOKUP_ORDER
        .iter()
        .filter_map(|pointer| response.pointer(pointer))
        .find_map(identifier_text)
}

fn identifier_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn top_level_social_id_wins() {
        let res = json!({
            "social_id": "top",
            "id": "row",
            "data": { "social_id": "nested", "id": "nested-row" }
        });
        assert_eq!(extract_social_id(&res).as_deref(), Some("top"));
    }

    #[test]
    fn nested_social_id_before_nested_id() {
        let res = json!({ "data": { "id": "row", "social_id": "abc123" } });
        assert_eq!(extract_social_id(&res).as_deref(), Some("abc123"));
    }

    #[test]
    fn nested_id_before_top_level_id() {
        let res = json!({ "id": 7, "data": { "id": "u-9" } });
        assert_eq!(extract_social_id(&res).as_deref(), Some("u-9"));
    }

    #[test]
    fn falls_back_to_numeric_top_level_id() {
        let res = json!({ "id": 1234, "name": "x" });
        assert_eq!(extract_social_id(&res).as_deref(), Some("1234"));
    }

    #[test]
    fn empty_and_non_scalar_candidates_are_skipped() {
        let res = json!({
            "social_id": "",
            "data": { "social_id": null, "id": { "nested": true } },
            "id": "fallback"
        });
        assert_eq!(extract_social_id(&res).as_deref(), Some("fallback"));
    }

    #[test]
    fn missing_identifier_yields_none() {
        assert_eq!(extract_social_id(&json!({ "ok": true })), None);
        assert_eq!(extract_social_id(&Value::Null), None);
        assert_eq!(extract_social_id(&json!("abc")), None);
    }

    #[test]
    fn query_pair_follows_variant() {
        let anon = Identity::Anonymous {
            udid: "udid_1_2".into(),
        };
        let user = Identity::Authenticated {
            social_id: "u1".into(),
        };
        assert_eq!(anon.query_pair(), ("udid", "udid_1_2"));
        assert_eq!(user.query_pair(), ("social_id", "u1"));
        assert!(user.is_authenticated());
        assert!(!anon.is_authenticated());
    }
}
