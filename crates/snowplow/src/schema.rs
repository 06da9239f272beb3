//! Self-describing record shapes accepted by the collector.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use beacon_core::types::UserEventType;

/// A schema-tagged record: an opaque Iglu schema identifier plus the data
/// body it describes. Both the event record and every context record take
/// this shape on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfDescribingJson {
    pub schema: String,
    pub data: Value,
}

impl SelfDescribingJson {
    pub fn new(schema: impl Into<String>, data: Value) -> Self {
        Self {
            schema: schema.into(),
            data,
        }
    }
}

/// Trigger label reported on the object-update event for each event kind.
pub fn trigger_label(event_type: UserEventType) -> &'static str {
    match event_type {
        UserEventType::AccountCreate => "account_create",
        UserEventType::AccountDelete => "account_delete",
        UserEventType::AccountEmailUpdated => "account_email_updated",
        UserEventType::AccountPasswordChanged => "account_password_changed",
    }
}

/// Data body of the object-update event record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectUpdate {
    pub trigger: String,
    pub object: String,
}

/// User context attached to every event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashed_guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashed_user_id: Option<String>,
}

/// API consumer context attached to every event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiUserContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_native: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_trusted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_version: Option<String>,
}

/// Account context attached to every event. `emails` is omitted on delete
/// events, where the address is no longer reportable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountContext {
    pub object_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
}

/// Numeric form of a string id. Missing or non-numeric ids yield `None`,
/// and the field drops out of the serialized context.
pub fn parse_id(id: Option<&str>) -> Option<u64> {
    id.and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_labels() {
        assert_eq!(trigger_label(UserEventType::AccountCreate), "account_create");
        assert_eq!(trigger_label(UserEventType::AccountDelete), "account_delete");
        assert_eq!(
            trigger_label(UserEventType::AccountEmailUpdated),
            "account_email_updated"
        );
        assert_eq!(
            trigger_label(UserEventType::AccountPasswordChanged),
            "account_password_changed"
        );
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(Some("42")), Some(42));
        assert_eq!(parse_id(Some("not-a-number")), None);
        assert_eq!(parse_id(Some("")), None);
        assert_eq!(parse_id(None), None);
    }

    #[test]
    fn test_account_context_omits_absent_fields() {
        let context = AccountContext {
            object_version: "new".to_string(),
            user_id: Some(42),
            emails: None,
        };
        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"object_version": "new", "user_id": 42})
        );
    }

    #[test]
    fn test_user_context_omits_absent_fields() {
        let context = UserContext {
            email: Some("a@b.com".to_string()),
            guid: None,
            hashed_guid: None,
            user_id: None,
            hashed_user_id: None,
        };
        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(json, serde_json::json!({"email": "a@b.com"}));
    }
}
