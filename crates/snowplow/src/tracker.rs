//! Tracker seam — envelope assembly and the emitter boundary.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use beacon_core::error::BeaconResult;
use beacon_core::types::RequestData;

use crate::schema::SelfDescribingJson;

/// Per-call request ambience attached to a tracked event.
///
/// Built fresh for every call and passed through [`Tracker::track`], so
/// concurrent calls on one tracker never observe another call's fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Subject {
    /// Subject for a payload's request metadata, all-`None` when absent.
    pub fn from_request(request: Option<&RequestData>) -> Self {
        match request {
            Some(req) => Self {
                language: req.language.clone(),
                domain_user_id: req.snowplow_domain_user_id.clone(),
                ip_address: req.ip_address.clone(),
                user_agent: req.user_agent.clone(),
            },
            None => Self::default(),
        }
    }
}

/// An assembled event plus its contexts, ready for an emitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub app_id: String,
    pub namespace: String,
    pub event: SelfDescribingJson,
    pub context: Vec<SelfDescribingJson>,
    pub subject: Subject,
    pub tstamp: DateTime<Utc>,
}

/// Transport boundary for assembled envelopes. Delivery, batching, and
/// retry live behind this trait.
#[async_trait]
pub trait Emitter: Send + Sync {
    async fn emit(&self, envelope: &EventEnvelope) -> BeaconResult<()>;
}

/// Stamps envelopes with identity and time, then forwards them to its
/// emitter. Emitter failures propagate unchanged to the caller.
pub struct Tracker {
    emitter: Arc<dyn Emitter>,
    app_id: String,
    namespace: String,
}

impl Tracker {
    pub fn new(
        emitter: Arc<dyn Emitter>,
        app_id: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            emitter,
            app_id: app_id.into(),
            namespace: namespace.into(),
        }
    }

    /// Assemble an envelope for the event and hand it to the emitter.
    /// Returns the generated event id.
    pub async fn track(
        &self,
        event: SelfDescribingJson,
        context: Vec<SelfDescribingJson>,
        subject: Subject,
    ) -> BeaconResult<Uuid> {
        let envelope = EventEnvelope {
            event_id: Uuid::new_v4(),
            app_id: self.app_id.clone(),
            namespace: self.namespace.clone(),
            event,
            context,
            subject,
            tstamp: Utc::now(),
        };

        debug!(
            event_id = %envelope.event_id,
            contexts = envelope.context.len(),
            "tracking event"
        );
        self.emitter.emit(&envelope).await?;
        Ok(envelope.event_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::CaptureEmitter;

    #[test]
    fn test_subject_from_request() {
        let request = RequestData {
            language: Some("en".to_string()),
            snowplow_domain_user_id: Some("d1".to_string()),
            ip_address: Some("1.2.3.4".to_string()),
            user_agent: Some("ua".to_string()),
        };
        let subject = Subject::from_request(Some(&request));
        assert_eq!(subject.language.as_deref(), Some("en"));
        assert_eq!(subject.domain_user_id.as_deref(), Some("d1"));
        assert_eq!(subject.ip_address.as_deref(), Some("1.2.3.4"));
        assert_eq!(subject.user_agent.as_deref(), Some("ua"));
    }

    #[test]
    fn test_subject_from_missing_request() {
        assert_eq!(Subject::from_request(None), Subject::default());
    }

    #[tokio::test]
    async fn test_track_stamps_and_forwards() {
        let emitter = Arc::new(CaptureEmitter::new());
        let tracker = Tracker::new(emitter.clone(), "beacon-test", "beacon");

        let event = SelfDescribingJson::new(
            "iglu:com.beacon/object_update/jsonschema/1-0-1",
            serde_json::json!({"trigger": "account_create", "object": "account"}),
        );
        let event_id = tracker
            .track(event.clone(), vec![], Subject::default())
            .await
            .unwrap();

        let sent = emitter.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].event_id, event_id);
        assert_eq!(sent[0].app_id, "beacon-test");
        assert_eq!(sent[0].namespace, "beacon");
        assert_eq!(sent[0].event, event);
        assert!(sent[0].context.is_empty());
    }
}
