use async_trait::async_trait;
use capi_common::event::{AttributionTrace, DestinationCredentials, FieldSources, RecordedEvent};
use capi_common::hashing::hash_opt;
use capi_common::mapping::map_event;
use capi_common::platform::Platform;
use serde_json::{json, Value};

use crate::adapter::{dedup_event_id, post_json, require_pixel_id, CapiAdapter, SkipReason};
use crate::error::RelayError;

const TRACK_PATH: &str = "/open_api/v1.3/event/track/";

/// TikTok Events API. One fixed endpoint; the pixel is identified by
/// `event_source_id` in the body and the key travels in an `Access-Token`
/// header. Geo fields (city/state/country) go out plaintext lower-cased,
/// per TikTok's contract; email/phone are hashed like everywhere else.
pub struct TikTokAdapter {
    base_url: String,
}

impl TikTokAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CapiAdapter for TikTokAdapter {
    fn platform(&self) -> Platform {
        Platform::TikTok
    }

    fn validate_event(
        &self,
        _event: &RecordedEvent,
        _trace: &AttributionTrace,
        _test_mode: bool,
    ) -> Result<(), SkipReason> {
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
        let secs = event.event_time_secs()?;
        let sources = FieldSources::new(event, trace);

        let lowercase = |value: Option<&str>| value.map(str::to_lowercase);
        let contents = sources.content_ids().map(|ids| {
            ids.iter()
                .map(|id| json!({ "content_id": id }))
                .collect::<Vec<_>>()
        });

        let mut payload = json!({
            "event_source": "web",
            "event_source_id": pixel_id,
            "data": [{
                "event": mapping.name,
                "event_time": secs,
                "event_id": dedup_event_id(&mapping.name, &event.trace_id, secs),
                "user": {
                    "email": hash_opt(sources.email()),
                    "phone": hash_opt(sources.phone()),
                    "external_id": hash_opt(sources.external_id()),
                    "ttclid": sources.click_id(),
                    "ip": sources.ip_address(),
                    "user_agent": sources.user_agent(),
                    "city": lowercase(sources.city()),
                    "state": lowercase(sources.region()),
                    "country": lowercase(sources.country()),
                },
                "properties": {
                    "value": sources.value(),
                    "currency": sources.currency(),
                    "content_type": sources.content_type(),
                    "contents": contents,
                },
                "page": {
                    "url": sources.page_url(),
                    "referrer": sources.page_referrer(),
                },
            }],
        });

        if test_mode {
            if let Some(test_id) = credentials.test_id.as_deref() {
                payload["test_event_code"] = json!(test_id);
            }
        }

        Ok(payload)
    }

    async fn dispatch(
        &self,
        client: &reqwest::Client,
        credentials: &DestinationCredentials,
        _test_mode: bool,
        payload: &Value,
    ) -> Result<(), RelayError> {
        let url = format!("{}{TRACK_PATH}", self.base_url);

        post_json(
            self.platform(),
            client
                .post(url)
                .header("Access-Token", &credentials.api_key)
                .json(payload),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capi_common::event::EventMetadata;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn credentials() -> DestinationCredentials {
        DestinationCredentials {
            api_key: "tt-secret".to_string(),
            pixel_id: Some("PX42".to_string()),
            test_id: None,
        }
    }

    fn event_with_geo() -> RecordedEvent {
        RecordedEvent {
            id: Uuid::now_v7(),
            trace_id: "trace-3".to_string(),
            user_id: None,
            name: "Purchase".to_string(),
            campaign_id: None,
            created_at: "2024-05-01 12:30:45".to_string(),
            payload: HashMap::new(),
            metadata: Some(EventMetadata {
                email: Some("Someone@Example.com".to_string()),
                city: Some("New York".to_string()),
                region: Some("NY".to_string()),
                country: Some("US".to_string()),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_geo_fields_are_plaintext_lowercase_not_hashed() {
        let adapter = TikTokAdapter::new("https://business-api.example");
        let payload = adapter
            .build_payload(
                &event_with_geo(),
                &AttributionTrace::default(),
                &credentials(),
                false,
            )
            .unwrap();

        let user = &payload["data"][0]["user"];
        assert_eq!(user["city"], "new york");
        assert_eq!(user["state"], "ny");
        assert_eq!(user["country"], "us");
        // Email is still hashed: sha256("someone@example.com").
        assert_eq!(
            user["email"],
            "72497f475e4f76d0b28f57c73a084ece576d170874eba3ee2609d9afe4b71aab"
        );
    }

    #[test]
    fn test_purchase_translates_to_complete_payment() {
        let adapter = TikTokAdapter::new("https://business-api.example");
        let payload = adapter
            .build_payload(
                &event_with_geo(),
                &AttributionTrace::default(),
                &credentials(),
                false,
            )
            .unwrap();
        assert_eq!(payload["data"][0]["event"], "CompletePayment");
        assert_eq!(payload["event_source_id"], "PX42");
    }

    #[test]
    fn test_test_mode_embeds_test_event_code() {
        let adapter = TikTokAdapter::new("https://business-api.example");
        let credentials = DestinationCredentials {
            test_id: Some("TTTEST1".to_string()),
            ..credentials()
        };

        let payload = adapter
            .build_payload(
                &event_with_geo(),
                &AttributionTrace::default(),
                &credentials,
                true,
            )
            .unwrap();
        assert_eq!(payload["test_event_code"], "TTTEST1");

        let live = adapter
            .build_payload(
                &event_with_geo(),
                &AttributionTrace::default(),
                &credentials,
                false,
            )
            .unwrap();
        assert!(live.get("test_event_code").is_none());
    }

    #[tokio::test]
    async fn test_send_event_uses_access_token_header_on_fixed_path() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/open_api/v1.3/event/track/")
                .header("Access-Token", "tt-secret");
            then.status(200).json_body(serde_json::json!({"code": 0}));
        });

        let adapter = TikTokAdapter::new(server.base_url());
        let client = reqwest::Client::new();
        let trace = AttributionTrace {
            click_id: Some("ttc123".to_string()),
            ..Default::default()
        };

        let delivery = adapter
            .send_event(&client, &event_with_geo(), &trace, &credentials(), false)
            .await
            .unwrap();

        mock.assert();
        let sent = delivery.payload().unwrap();
        assert_eq!(sent["data"][0]["user"]["ttclid"], "ttc123");
        // Empty page block cleans away when neither url nor referrer resolve.
        assert!(sent["data"][0].get("page").is_none());
    }
}
