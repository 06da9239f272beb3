//! Emitter implementations for assembled event envelopes.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::debug;

use beacon_core::error::BeaconResult;

use crate::tracker::{Emitter, EventEnvelope};

/// Envelope wrapper schema for a collector POST body.
pub const PAYLOAD_DATA_SCHEMA: &str =
    "iglu:com.snowplowanalytics.snowplow/payload_data/jsonschema/1-0-4";

/// Wrapper schema for a self-describing event body.
pub const UNSTRUCT_EVENT_SCHEMA: &str =
    "iglu:com.snowplowanalytics.snowplow/unstruct_event/jsonschema/1-0-0";

/// Wrapper schema for the custom context list.
pub const CONTEXTS_SCHEMA: &str =
    "iglu:com.snowplowanalytics.snowplow/contexts/jsonschema/1-0-1";

/// Emitter that renders envelopes into the collector's POST body shape.
/// In production: POST to `<endpoint>/com.snowplowanalytics.snowplow/tp2`.
pub struct CollectorEmitter {
    endpoint: String,
}

impl CollectorEmitter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Collector POST body for a single envelope.
    fn render_body(&self, envelope: &EventEnvelope) -> BeaconResult<Value> {
        let ue_pr = serde_json::to_string(&json!({
            "schema": UNSTRUCT_EVENT_SCHEMA,
            "data": envelope.event,
        }))?;
        let co = serde_json::to_string(&json!({
            "schema": CONTEXTS_SCHEMA,
            "data": envelope.context,
        }))?;

        let mut event = serde_json::Map::new();
        event.insert("e".to_string(), json!("ue"));
        event.insert("p".to_string(), json!("srv"));
        event.insert("eid".to_string(), json!(envelope.event_id.to_string()));
        event.insert("aid".to_string(), json!(envelope.app_id));
        event.insert("tna".to_string(), json!(envelope.namespace));
        event.insert(
            "dtm".to_string(),
            json!(envelope.tstamp.timestamp_millis().to_string()),
        );
        event.insert("ue_pr".to_string(), json!(ue_pr));
        event.insert("co".to_string(), json!(co));

        // Subject fields ride along as top-level tracker parameters.
        if let Some(lang) = &envelope.subject.language {
            event.insert("lang".to_string(), json!(lang));
        }
        if let Some(duid) = &envelope.subject.domain_user_id {
            event.insert("duid".to_string(), json!(duid));
        }
        if let Some(ip) = &envelope.subject.ip_address {
            event.insert("ip".to_string(), json!(ip));
        }
        if let Some(ua) = &envelope.subject.user_agent {
            event.insert("ua".to_string(), json!(ua));
        }

        Ok(json!({
            "schema": PAYLOAD_DATA_SCHEMA,
            "data": [Value::Object(event)],
        }))
    }
}

#[async_trait]
impl Emitter for CollectorEmitter {
    async fn emit(&self, envelope: &EventEnvelope) -> BeaconResult<()> {
        let body = self.render_body(envelope)?;

        debug!(
            endpoint = %self.endpoint,
            event_id = %envelope.event_id,
            body = %body,
            "emitting event to collector"
        );
        metrics::counter!("beacon.collector.events_emitted").increment(1);
        Ok(())
    }
}

/// Emitter that records envelopes instead of sending them. Test double for
/// exercising the dispatch path end to end.
#[derive(Default)]
pub struct CaptureEmitter {
    sent: Mutex<Vec<EventEnvelope>>,
}

impl CaptureEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All envelopes emitted so far, in order.
    pub fn sent(&self) -> Vec<EventEnvelope> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Emitter for CaptureEmitter {
    async fn emit(&self, envelope: &EventEnvelope) -> BeaconResult<()> {
        self.sent.lock().push(envelope.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SelfDescribingJson;
    use crate::tracker::Subject;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_envelope() -> EventEnvelope {
        EventEnvelope {
            event_id: Uuid::new_v4(),
            app_id: "beacon-test".to_string(),
            namespace: "beacon".to_string(),
            event: SelfDescribingJson::new(
                "iglu:com.beacon/object_update/jsonschema/1-0-1",
                json!({"trigger": "account_create", "object": "account"}),
            ),
            context: vec![SelfDescribingJson::new(
                "iglu:com.beacon/user/jsonschema/1-0-0",
                json!({"email": "a@b.com"}),
            )],
            subject: Subject {
                language: Some("en".to_string()),
                domain_user_id: None,
                ip_address: Some("1.2.3.4".to_string()),
                user_agent: None,
            },
            tstamp: Utc::now(),
        }
    }

    #[test]
    fn test_render_body_shape() {
        let emitter = CollectorEmitter::new("http://localhost:9090");
        let envelope = sample_envelope();
        let body = emitter.render_body(&envelope).unwrap();

        assert_eq!(body["schema"], PAYLOAD_DATA_SCHEMA);
        let event = &body["data"][0];
        assert_eq!(event["e"], "ue");
        assert_eq!(event["p"], "srv");
        assert_eq!(event["aid"], "beacon-test");
        assert_eq!(event["tna"], "beacon");
        assert_eq!(event["eid"], envelope.event_id.to_string());
        assert_eq!(event["lang"], "en");
        assert_eq!(event["ip"], "1.2.3.4");
        assert!(event.get("duid").is_none());
        assert!(event.get("ua").is_none());

        // The event and context payloads are embedded as JSON strings.
        let ue_pr: Value = serde_json::from_str(event["ue_pr"].as_str().unwrap()).unwrap();
        assert_eq!(ue_pr["schema"], UNSTRUCT_EVENT_SCHEMA);
        assert_eq!(ue_pr["data"]["data"]["trigger"], "account_create");

        let co: Value = serde_json::from_str(event["co"].as_str().unwrap()).unwrap();
        assert_eq!(co["schema"], CONTEXTS_SCHEMA);
        assert_eq!(co["data"][0]["data"]["email"], "a@b.com");
    }

    #[tokio::test]
    async fn test_capture_emitter_records_in_order() {
        let emitter = CaptureEmitter::new();
        let first = sample_envelope();
        let second = sample_envelope();

        emitter.emit(&first).await.unwrap();
        emitter.emit(&second).await.unwrap();

        let sent = emitter.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].event_id, first.event_id);
        assert_eq!(sent[1].event_id, second.event_id);
    }
}
