use async_trait::async_trait;
use capi_common::event::{AttributionTrace, DestinationCredentials, FieldSources, RecordedEvent};
use capi_common::mapping::{map_event, normalize_canonical};
use capi_common::platform::Platform;
use serde_json::{json, Value};

use crate::adapter::{dedup_event_id, post_json, require_pixel_id, CapiAdapter, SkipReason};
use crate::error::RelayError;

/// Commerce fields Reddit rejects on non-commerce event types.
const COMMERCE_METADATA_EXCLUSIONS: &[&str] = &[
    "events.event_metadata.item_count",
    "events.event_metadata.value_decimal",
    "events.event_metadata.currency",
];

/// Reddit Conversions API.
///
/// Two deliberate oddities of this destination's contract: email and phone
/// are sent PLAINTEXT (Reddit's API takes unhashed identifiers for these
/// fields), and a handful of canonical events are force-sent as custom even
/// though a native tracking type exists for them.
pub struct RedditAdapter {
    base_url: String,
}

impl RedditAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn force_custom(canonical: &str) -> bool {
        matches!(normalize_canonical(canonical).as_str(), "INITCHECKOUT")
    }
}

#[async_trait]
impl CapiAdapter for RedditAdapter {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    fn exclusions(&self, mapped_name: &str) -> Option<&'static [&'static str]> {
        match mapped_name {
            "PageVisit" | "Search" => Some(COMMERCE_METADATA_EXCLUSIONS),
            _ => None,
        }
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
        let millis = event.event_time_millis()?;
        let sources = FieldSources::new(event, trace);

        let event_type = if mapping.is_custom || Self::force_custom(&event.name) {
            json!({
                "tracking_type": "Custom",
                "custom_event_name": event.name,
            })
        } else {
            json!({ "tracking_type": mapping.name })
        };

        let products = sources.content_ids().map(|ids| {
            ids.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>()
        });

        let mut payload = json!({
            "events": [{
                "event_at": millis,
                "click_id": sources.click_id(),
                "event_type": event_type,
                "user": {
                    // Plaintext by destination contract; see DESIGN.md.
                    "email": sources.email(),
                    "phone_number": sources.phone(),
                    "external_id": sources.external_id(),
                    "ip_address": sources.ip_address(),
                    "user_agent": sources.user_agent(),
                },
                "event_metadata": {
                    "value_decimal": sources.value(),
                    "currency": sources.currency(),
                    "item_count": sources.item_count(),
                    "conversion_id": dedup_event_id(&mapping.name, &event.trace_id, secs),
                    "products": products,
                },
            }],
        });

        if test_mode {
            payload["test_mode"] = json!(true);
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
        let url = format!("{}/{pixel_id}/conversion_events", self.base_url);

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
