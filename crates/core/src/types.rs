//! Shared event contract — payloads consumed from the user event stream.

use serde::{Deserialize, Serialize};

/// Kind of account activity reported by the upstream event stream.
///
/// Closed set: a payload carrying any other string fails deserialization
/// at the boundary rather than producing an event with no trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserEventType {
    AccountCreate,
    AccountDelete,
    AccountEmailUpdated,
    AccountPasswordChanged,
}

/// A user event as delivered by the upstream stream (camelCase JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEventPayload {
    pub event_type: UserEventType,
    pub user: UserData,
    pub api_user: ApiUserData,
    pub request: Option<RequestData>,
}

/// The account the event is about. All fields are optional upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub id: Option<String>,
    pub email: Option<String>,
    pub guid: Option<String>,
    pub hashed_guid: Option<String>,
    pub hashed_id: Option<String>,
}

/// The API consumer that performed the action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUserData {
    pub api_id: Option<String>,
    pub name: Option<String>,
    pub is_native: Option<bool>,
    pub is_trusted: Option<bool>,
    pub client_version: Option<String>,
}

/// Request metadata captured where the event originated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestData {
    pub language: Option<String>,
    pub snowplow_domain_user_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
