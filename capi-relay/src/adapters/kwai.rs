use async_trait::async_trait;
use capi_common::event::{AttributionTrace, DestinationCredentials, FieldSources, RecordedEvent};
use capi_common::hashing::hash_opt;
use capi_common::mapping::map_event;
use capi_common::platform::Platform;
use serde_json::{json, Value};

use crate::adapter::{post_json, require_pixel_id, CapiAdapter, SkipReason};
use crate::error::RelayError;

/// Kwai Conversion API. The strictest destination: no custom events (an
/// unmapped name is skipped at validation), a click id is mandatory outside
/// test mode, and the access token travels inside the JSON body rather than
/// a header.
pub struct KwaiAdapter {
    endpoint: String,
}

impl KwaiAdapter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl CapiAdapter for KwaiAdapter {
    fn platform(&self) -> Platform {
        Platform::Kwai
    }

    fn exclusions(&self, _mapped_name: &str) -> Option<&'static [&'static str]> {
        // Upstream defines an exclusion table for Kwai with every entry
        // disabled; kept empty until the intended paths are confirmed.
        None
    }

    fn validate_event(
        &self,
        event: &RecordedEvent,
        trace: &AttributionTrace,
        test_mode: bool,
    ) -> Result<(), SkipReason> {
        let mapping = map_event(self.platform(), &event.name);
        if mapping.is_custom {
            return Err(SkipReason::UnsupportedEvent {
                platform: self.platform(),
                event: event.name.clone(),
            });
        }

        if trace.click_id.is_none() && !test_mode {
            return Err(SkipReason::MissingClickId {
                platform: self.platform(),
            });
        }

        Ok(())
    }

    fn build_payload(
        &self,
        event: &RecordedEvent,
        trace: &AttributionTrace,
        credentials: &DestinationCredentials,
        test_mode: bool,
    ) -> Result<Value, RelayError> {
        let pixel_id = require_pixel_id(self.platform(), credentials)?;

        let mapping = map_event(self.platform(), &event.name);
        let millis = event.event_time_millis()?;
        let sources = FieldSources::new(event, trace);

        // In test mode the destination's own test identifier stands in for
        // the click id.
        let click_id = if test_mode {
            credentials.test_id.as_deref().or(sources.click_id())
        } else {
            sources.click_id()
        };

        let test_flag = test_mode.then_some(true);

        let payload = json!({
            "access_token": credentials.api_key,
            "pixel_id": pixel_id,
            "clickid": click_id,
            "event_name": mapping.name,
            "event_timestamp": millis,
            "test_flag": test_flag,
            "properties": {
                "value": sources.value(),
                "currency": sources.currency(),
                "quantity": sources.item_count(),
                "content_ids": sources.content_ids(),
                "user": {
                    "email": hash_opt(sources.email()),
                    "phone": hash_opt(sources.phone()),
                },
            },
        });

        Ok(payload)
    }

    async fn dispatch(
        &self,
        client: &reqwest::Client,
        _credentials: &DestinationCredentials,
        _test_mode: bool,
        payload: &Value,
    ) -> Result<(), RelayError> {
        // Auth is the access_token field already inside the payload.
        post_json(self.platform(), client.post(&self.endpoint).json(payload)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Delivery;
    use capi_common::event::EventMetadata;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn credentials() -> DestinationCredentials {
        DestinationCredentials {
            api_key: "kw-secret".to_string(),
            pixel_id: Some("kwai-px".to_string()),
            test_id: Some("TEST-CLICK".to_string()),
        }
    }

    fn recorded(name: &str) -> RecordedEvent {
        RecordedEvent {
            id: Uuid::now_v7(),
            trace_id: "trace-2".to_string(),
            user_id: None,
            name: name.to_string(),
            campaign_id: None,
            created_at: "2024-05-01 12:30:45".to_string(),
            payload: HashMap::new(),
            metadata: Some(EventMetadata {
                email: Some("a@b.com".to_string()),
                ..Default::default()
            }),
        }
    }

    #[tokio::test]
    async fn test_missing_click_id_skips_without_any_http_call() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST);
            then.status(200);
        });

        let adapter = KwaiAdapter::new(server.base_url());
        let client = reqwest::Client::new();

        let delivery = adapter
            .send_event(
                &client,
                &recorded("PAGEVIEW"),
                &AttributionTrace::default(),
                &credentials(),
                false,
            )
            .await
            .unwrap();

        assert!(matches!(
            delivery,
            Delivery::Skipped(SkipReason::MissingClickId { .. })
        ));
        mock.assert_hits(0);
    }

    #[test]
    fn test_custom_events_are_rejected_at_validation() {
        let adapter = KwaiAdapter::new("https://kwai.example");
        let result = adapter.validate_event(
            &recorded("newsletter_scroll"),
            &AttributionTrace {
                click_id: Some("ck1".to_string()),
                ..Default::default()
            },
            false,
        );
        assert!(matches!(
            result,
            Err(SkipReason::UnsupportedEvent { .. })
        ));
    }

    #[test]
    fn test_access_token_is_carried_in_the_body() {
        let adapter = KwaiAdapter::new("https://kwai.example");
        let trace = AttributionTrace {
            click_id: Some("ck1".to_string()),
            ..Default::default()
        };

        let payload = adapter
            .build_payload(&recorded("Purchase"), &trace, &credentials(), false)
            .unwrap();
        assert_eq!(payload["access_token"], "kw-secret");
        assert_eq!(payload["pixel_id"], "kwai-px");
        assert_eq!(payload["clickid"], "ck1");
        assert_eq!(payload["event_name"], "EVENT_PURCHASE");
        assert_eq!(payload["event_timestamp"], 1714566645000i64);
    }

    #[test]
    fn test_test_mode_substitutes_the_test_identifier_for_the_click_id() {
        let adapter = KwaiAdapter::new("https://kwai.example");
        let trace = AttributionTrace {
            click_id: Some("ck1".to_string()),
            ..Default::default()
        };

        let payload = adapter
            .build_payload(&recorded("Purchase"), &trace, &credentials(), true)
            .unwrap();
        assert_eq!(payload["clickid"], "TEST-CLICK");
        assert_eq!(payload["test_flag"], true);
    }

    #[tokio::test]
    async fn test_mapped_event_with_click_id_is_delivered() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).json_body_partial(
                r#"{"access_token": "kw-secret", "event_name": "EVENT_PURCHASE"}"#,
            );
            then.status(200).json_body(serde_json::json!({"result": 1}));
        });

        let adapter = KwaiAdapter::new(server.base_url());
        let client = reqwest::Client::new();
        let trace = AttributionTrace {
            click_id: Some("ck1".to_string()),
            ..Default::default()
        };

        let delivery = adapter
            .send_event(&client, &recorded("Purchase"), &trace, &credentials(), false)
            .await
            .unwrap();

        mock.assert();
        let sent = delivery.payload().unwrap();
        // sha256("a@b.com")
        assert_eq!(
            sent["properties"]["user"]["email"],
            "fb98d44ad7501a959f3f4f4a3f004fe2d9e581ea6207e218c4b02c08a4d75adf"
        );
        assert!(sent.get("test_flag").is_none());
    }
}
