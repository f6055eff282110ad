use async_trait::async_trait;
use capi_common::event::{AttributionTrace, DestinationCredentials, FieldSources, RecordedEvent};
use capi_common::hashing::hash_opt;
use capi_common::mapping::map_event;
use capi_common::platform::Platform;
use serde_json::{json, Value};

use crate::adapter::{dedup_event_id, post_json, require_pixel_id, CapiAdapter, SkipReason};
use crate::error::RelayError;

/// Facebook/Meta Conversions API. Accepts arbitrary custom event names, so
/// validation never skips; every personal-data field goes out as a single
/// hashed string.
pub struct FacebookAdapter {
    base_url: String,
}

impl FacebookAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CapiAdapter for FacebookAdapter {
    fn platform(&self) -> Platform {
        Platform::Facebook
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
        require_pixel_id(self.platform(), credentials)?;

        let mapping = map_event(self.platform(), &event.name);
        let secs = event.event_time_secs()?;
        let sources = FieldSources::new(event, trace);

        // Meta's click-id cookie format; the middle component is a
        // millisecond timestamp, derived from the event, never from now.
        let fbc = sources
            .click_id()
            .map(|id| format!("fb.1.{}.{id}", secs * 1000));

        let mut payload = json!({
            "data": [{
                "event_name": mapping.name,
                "event_time": secs,
                "event_id": dedup_event_id(&mapping.name, &event.trace_id, secs),
                "action_source": sources.action_source().unwrap_or("website"),
                "event_source_url": sources.page_url(),
                "user_data": {
                    "em": hash_opt(sources.email()),
                    "ph": hash_opt(sources.phone()),
                    "fn": hash_opt(sources.first_name()),
                    "ln": hash_opt(sources.last_name()),
                    "ct": hash_opt(sources.city()),
                    "st": hash_opt(sources.region()),
                    "zp": hash_opt(sources.postal_code()),
                    "country": hash_opt(sources.country()),
                    "db": hash_opt(sources.birth_date()),
                    "external_id": hash_opt(sources.external_id()),
                    "client_ip_address": sources.ip_address(),
                    "client_user_agent": sources.user_agent(),
                    "fbc": fbc,
                },
                "custom_data": {
                    "value": sources.value(),
                    "currency": sources.currency(),
                    "content_ids": sources.content_ids(),
                    "content_type": sources.content_type(),
                    "num_items": sources.item_count(),
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
        let pixel_id = require_pixel_id(self.platform(), credentials)?;
        let url = format!("{}/{pixel_id}/events", self.base_url);

        post_json(
            self.platform(),
            client
                .post(url)
                .bearer_auth(&credentials.api_key)
                .json(payload),
        )
        .await
    }
}
