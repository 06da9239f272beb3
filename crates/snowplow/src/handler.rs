//! User event handler — reshapes account activity into collector records.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use beacon_core::config::SchemaConfig;
use beacon_core::error::BeaconResult;
use beacon_core::types::{UserEventPayload, UserEventType};

use crate::schema::{
    parse_id, trigger_label, AccountContext, ApiUserContext, ObjectUpdate, SelfDescribingJson,
    UserContext,
};
use crate::tracker::{Subject, Tracker};

/// Handler for one family of events off the stream.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn process(&self, payload: &UserEventPayload) -> BeaconResult<()>;
}

/// Reshapes a user event into an object-update event plus user, api-user,
/// and account contexts, then forwards them through the tracker.
pub struct UserEventHandler {
    tracker: Arc<Tracker>,
    schemas: SchemaConfig,
}

impl UserEventHandler {
    pub fn new(tracker: Arc<Tracker>, schemas: SchemaConfig) -> Self {
        Self { tracker, schemas }
    }

    fn object_update_event(&self, payload: &UserEventPayload) -> BeaconResult<SelfDescribingJson> {
        let data = ObjectUpdate {
            trigger: trigger_label(payload.event_type).to_string(),
            object: "account".to_string(),
        };
        Ok(SelfDescribingJson::new(
            self.schemas.object_update.clone(),
            serde_json::to_value(data)?,
        ))
    }

    fn user_context(&self, payload: &UserEventPayload) -> BeaconResult<SelfDescribingJson> {
        let user = &payload.user;
        let data = UserContext {
            email: user.email.clone(),
            guid: user.guid.clone(),
            hashed_guid: user.hashed_guid.clone(),
            user_id: parse_id(user.id.as_deref()),
            hashed_user_id: user.hashed_id.clone(),
        };
        Ok(SelfDescribingJson::new(
            self.schemas.user.clone(),
            serde_json::to_value(data)?,
        ))
    }

    fn api_user_context(&self, payload: &UserEventPayload) -> BeaconResult<SelfDescribingJson> {
        let api_user = &payload.api_user;
        let data = ApiUserContext {
            api_id: parse_id(api_user.api_id.as_deref()),
            name: api_user.name.clone(),
            is_native: api_user.is_native,
            is_trusted: api_user.is_trusted,
            client_version: api_user.client_version.clone(),
        };
        Ok(SelfDescribingJson::new(
            self.schemas.api_user.clone(),
            serde_json::to_value(data)?,
        ))
    }

    /// Account context for delete events: the address list is no longer
    /// reportable, so `emails` is omitted.
    fn delete_account_context(&self, payload: &UserEventPayload) -> BeaconResult<SelfDescribingJson> {
        let data = AccountContext {
            object_version: "new".to_string(),
            user_id: parse_id(payload.user.id.as_deref()),
            emails: None,
        };
        Ok(SelfDescribingJson::new(
            self.schemas.account.clone(),
            serde_json::to_value(data)?,
        ))
    }

    fn account_context(&self, payload: &UserEventPayload) -> BeaconResult<SelfDescribingJson> {
        let data = AccountContext {
            object_version: "new".to_string(),
            user_id: parse_id(payload.user.id.as_deref()),
            emails: Some(payload.user.email.clone().into_iter().collect()),
        };
        Ok(SelfDescribingJson::new(
            self.schemas.account.clone(),
            serde_json::to_value(data)?,
        ))
    }

    /// Context list for an event: always `[user, api-user, account]`.
    fn event_context(&self, payload: &UserEventPayload) -> BeaconResult<Vec<SelfDescribingJson>> {
        let mut context = vec![self.user_context(payload)?, self.api_user_context(payload)?];

        if payload.event_type == UserEventType::AccountDelete {
            context.push(self.delete_account_context(payload)?);
        } else {
            context.push(self.account_context(payload)?);
        }
        Ok(context)
    }
}

#[async_trait]
impl EventHandler for UserEventHandler {
    async fn process(&self, payload: &UserEventPayload) -> BeaconResult<()> {
        let subject = Subject::from_request(payload.request.as_ref());
        let event = self.object_update_event(payload)?;
        let context = self.event_context(payload)?;

        let event_id = self.tracker.track(event, context, subject).await?;
        info!(
            %event_id,
            trigger = trigger_label(payload.event_type),
            "user event forwarded"
        );
        Ok(())
    }
}
