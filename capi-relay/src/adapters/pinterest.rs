use async_trait::async_trait;
use capi_common::event::{AttributionTrace, DestinationCredentials, FieldSources, RecordedEvent};
use capi_common::hashing::hash_opt_array;
use capi_common::mapping::map_event;
use capi_common::platform::Platform;
use serde_json::{json, Value};

use crate::adapter::{dedup_event_id, post_json, require_pixel_id, CapiAdapter, SkipReason};
use crate::device::{language_from_accept, DeviceInfo};
use crate::error::RelayError;

/// Pinterest Conversions API. Hashed identifiers go out wrapped in
/// single-element arrays; device, OS and language context is inferred from
/// the attributed user-agent whenever the event did not record it
/// explicitly. Unmapped events fall back to the `custom` event name.
pub struct PinterestAdapter {
    base_url: String,
}

impl PinterestAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

/// Explicitly recorded enrichment beats anything we infer.
fn extra_str<'e>(event: &'e RecordedEvent, key: &str) -> Option<&'e str> {
    event.metadata.as_ref()?.extra.get(key)?.as_str()
}

#[async_trait]
impl CapiAdapter for PinterestAdapter {
    fn platform(&self) -> Platform {
        Platform::Pinterest
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
        _test_mode: bool,
    ) -> Result<Value, RelayError> {
        require_pixel_id(self.platform(), credentials)?;

        let mapping = map_event(self.platform(), &event.name);
        let event_name = if mapping.is_custom {
            "custom".to_string()
        } else {
            mapping.name.clone()
        };
        let secs = event.event_time_secs()?;
        let sources = FieldSources::new(event, trace);

        let device = DeviceInfo::parse(sources.user_agent());
        let language = extra_str(event, "language")
            .map(str::to_owned)
            .or_else(|| sources.accept_language().and_then(language_from_accept));

        let payload = json!({
            "data": [{
                "event_name": event_name,
                "action_source": sources.action_source().unwrap_or("web"),
                "event_time": secs,
                "event_id": dedup_event_id(&mapping.name, &event.trace_id, secs),
                "event_source_url": sources.page_url(),
                "user_data": {
                    "em": hash_opt_array(sources.email()),
                    "ph": hash_opt_array(sources.phone()),
                    "fn": hash_opt_array(sources.first_name()),
                    "ln": hash_opt_array(sources.last_name()),
                    "ct": hash_opt_array(sources.city()),
                    "st": hash_opt_array(sources.region()),
                    "zp": hash_opt_array(sources.postal_code()),
                    "country": hash_opt_array(sources.country()),
                    "db": hash_opt_array(sources.birth_date()),
                    "external_id": hash_opt_array(sources.external_id()),
                    "client_ip_address": sources.ip_address(),
                    "client_user_agent": sources.user_agent(),
                },
                "custom_data": {
                    // Pinterest takes monetary values as strings.
                    "value": sources.value().map(|v| v.to_string()),
                    "currency": sources.currency(),
                    "content_ids": sources.content_ids(),
                    "num_items": sources.item_count(),
                },
                "device_type": extra_str(event, "device_type").or(device.device_type),
                "device_brand": extra_str(event, "device_brand").or(device.brand),
                "device_model": extra_str(event, "device_model").map(str::to_owned).or(device.model),
                "os_version": extra_str(event, "os_version").map(str::to_owned).or(device.os_version),
                "app_id": extra_str(event, "app_id"),
                "wifi": event.metadata.as_ref().and_then(|m| m.extra.get("wifi").cloned()),
                "language": language,
            }],
        });

        Ok(payload)
    }

    async fn dispatch(
        &self,
        client: &reqwest::Client,
        credentials: &DestinationCredentials,
        test_mode: bool,
        payload: &Value,
    ) -> Result<(), RelayError> {
        let pixel_id = require_pixel_id(self.platform(), credentials)?;
        let mut url = format!("{}/{pixel_id}/events", self.base_url);
        if test_mode {
            url.push_str("?test=true");
        }

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
