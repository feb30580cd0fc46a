//! User record domain model.

use serde::{Deserialize, Serialize};

use crate::models::tier::Tier;

/// The persisted identity, keyed by `username` in the user store.
///
/// Serialized with the short field names used on the wire
/// (`user`, `passwd`, `perms`, `jwt`); empty fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "user", default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    /// Pre-hashed password. Never the plaintext.
    #[serde(rename = "passwd", default, skip_serializing_if = "String::is_empty")]
    pub credential_hash: String,
    /// A missing `perms` field decodes as the basic tier.
    #[serde(rename = "perms", default)]
    pub tier: Tier,
    /// Cached copy of the last credential issued to this user. Not
    /// authoritative.
    #[serde(rename = "jwt", default, skip_serializing_if = "Option::is_none")]
    pub last_issued_token: Option<String>,
}

impl UserRecord {
    pub fn new(username: impl Into<String>, credential_hash: impl Into<String>, tier: Tier) -> Self {
        Self {
            username: username.into(),
            credential_hash: credential_hash.into(),
            tier,
            last_issued_token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_wire_field_names() {
        let record = UserRecord::new("admin", "abc123", Tier::Admin);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "user": "admin", "passwd": "abc123", "perms": 2 })
        );
    }

    #[test]
    fn cached_token_is_emitted_when_present() {
        let mut record = UserRecord::new("alice", "h", Tier::User);
        record.last_issued_token = Some("a.b.c".into());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["jwt"], "a.b.c");
    }

    #[test]
    fn absent_fields_decode_to_defaults() {
        let record: UserRecord = serde_json::from_str(r#"{"user":"bob"}"#).unwrap();
        assert_eq!(record.username, "bob");
        assert!(record.credential_hash.is_empty());
        assert_eq!(record.tier, Tier::User);
        assert_eq!(record.last_issued_token, None);
    }

    #[test]
    fn unknown_tier_code_fails_to_decode() {
        let result = serde_json::from_str::<UserRecord>(r#"{"user":"bob","perms":9}"#);
        assert!(result.is_err());
    }
}
