use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Format used by the ingestion layer for `created_at`.
const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug, PartialEq, Eq)]
#[error("failed to parse event timestamp {0:?}")]
pub struct TimestampError(pub String);

/// A canonically recorded marketing event, resolved upstream and immutable
/// for the duration of one replication call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordedEvent {
    pub id: Uuid,
    /// Correlates the event to its `AttributionTrace`.
    pub trace_id: String,
    pub user_id: Option<String>,
    /// Canonical event name, before any destination translation.
    pub name: String,
    pub campaign_id: Option<String>,
    /// SQL-format timestamp (`YYYY-MM-DD HH:MM:SS`), UTC.
    pub created_at: String,
    #[serde(default)]
    pub payload: HashMap<String, Value>,
    pub metadata: Option<EventMetadata>,
}

impl RecordedEvent {
    /// Event time in Unix seconds, derived strictly from `created_at`.
    ///
    /// Destinations validate event freshness and deduplicate on identifiers
    /// derived from this value, so it must never fall back to wall clock.
    pub fn event_time_secs(&self) -> Result<i64, TimestampError> {
        let parsed = NaiveDateTime::parse_from_str(&self.created_at, CREATED_AT_FORMAT)
            .map_err(|_| TimestampError(self.created_at.clone()))?;
        Ok(parsed.and_utc().timestamp())
    }

    /// Event time in Unix milliseconds, for destinations that want them.
    pub fn event_time_millis(&self) -> Result<i64, TimestampError> {
        self.event_time_secs().map(|secs| secs * 1000)
    }
}

/// Destination-agnostic enrichment captured alongside the event. Every field
/// is optional; adapters omit what is absent.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EventMetadata {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub birth_date: Option<String>,
    pub currency: Option<String>,
    pub value: Option<f64>,
    pub item_count: Option<i64>,
    pub content_ids: Option<Vec<String>>,
    pub content_type: Option<String>,
    pub action_source: Option<String>,
    pub page_url: Option<String>,
    pub page_referrer: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    /// Anything else the ingestion layer recorded that no adapter maps.
    #[serde(flatten, default)]
    pub extra: HashMap<String, Value>,
}

/// Click/session context correlated to an event via its trace reference.
/// Supplies fallback values when metadata omits them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AttributionTrace {
    pub click_id: Option<String>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub destination_url: Option<String>,
    pub accept_language: Option<String>,
    pub user_id: Option<String>,
}

/// Secret bundle resolved per destination account ("pixel").
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DestinationCredentials {
    pub api_key: String,
    pub pixel_id: Option<String>,
    /// Sandbox/test identifier; how it is embedded is destination-specific.
    pub test_id: Option<String>,
}

/// One event/trace pair viewed through the field-resolution priority every
/// adapter must respect: explicit metadata first, trace-derived fallback
/// second, absent otherwise.
pub struct FieldSources<'a> {
    pub event: &'a RecordedEvent,
    pub trace: &'a AttributionTrace,
}

impl<'a> FieldSources<'a> {
    pub fn new(event: &'a RecordedEvent, trace: &'a AttributionTrace) -> Self {
        Self { event, trace }
    }

    fn metadata(&self) -> Option<&EventMetadata> {
        self.event.metadata.as_ref()
    }

    pub fn email(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.email.as_deref())
    }

    pub fn phone(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.phone.as_deref())
    }

    pub fn first_name(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.first_name.as_deref())
    }

    pub fn last_name(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.last_name.as_deref())
    }

    pub fn birth_date(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.birth_date.as_deref())
    }

    pub fn city(&self) -> Option<&str> {
        self.metadata()
            .and_then(|m| m.city.as_deref())
            .or(self.trace.city.as_deref())
    }

    pub fn region(&self) -> Option<&str> {
        self.metadata()
            .and_then(|m| m.region.as_deref())
            .or(self.trace.region.as_deref())
    }

    pub fn country(&self) -> Option<&str> {
        self.metadata()
            .and_then(|m| m.country.as_deref())
            .or(self.trace.country.as_deref())
    }

    pub fn postal_code(&self) -> Option<&str> {
        self.metadata()
            .and_then(|m| m.postal_code.as_deref())
            .or(self.trace.postal_code.as_deref())
    }

    pub fn ip_address(&self) -> Option<&str> {
        self.metadata()
            .and_then(|m| m.ip_address.as_deref())
            .or(self.trace.ip.as_deref())
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.metadata()
            .and_then(|m| m.user_agent.as_deref())
            .or(self.trace.user_agent.as_deref())
    }

    pub fn page_url(&self) -> Option<&str> {
        self.metadata()
            .and_then(|m| m.page_url.as_deref())
            .or(self.trace.destination_url.as_deref())
    }

    pub fn page_referrer(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.page_referrer.as_deref())
    }

    pub fn external_id(&self) -> Option<&str> {
        self.event
            .user_id
            .as_deref()
            .or(self.trace.user_id.as_deref())
    }

    pub fn click_id(&self) -> Option<&str> {
        self.trace.click_id.as_deref()
    }

    pub fn currency(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.currency.as_deref())
    }

    pub fn value(&self) -> Option<f64> {
        self.metadata().and_then(|m| m.value)
    }

    pub fn item_count(&self) -> Option<i64> {
        self.metadata().and_then(|m| m.item_count)
    }

    pub fn content_ids(&self) -> Option<&[String]> {
        self.metadata().and_then(|m| m.content_ids.as_deref())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.content_type.as_deref())
    }

    pub fn action_source(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.action_source.as_deref())
    }

    pub fn accept_language(&self) -> Option<&str> {
        self.trace.accept_language.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_with_created_at(created_at: &str) -> RecordedEvent {
        RecordedEvent {
            id: Uuid::now_v7(),
            trace_id: "trace-1".to_string(),
            user_id: None,
            name: "Purchase".to_string(),
            campaign_id: None,
            created_at: created_at.to_string(),
            payload: HashMap::new(),
            metadata: None,
        }
    }

    #[test]
    fn test_event_time_derives_from_created_at() {
        let event = event_with_created_at("2024-05-01 12:30:45");
        assert_eq!(event.event_time_secs().unwrap(), 1714566645);
        assert_eq!(event.event_time_millis().unwrap(), 1714566645000);
    }

    #[test]
    fn test_unparseable_created_at_is_an_error() {
        let event = event_with_created_at("yesterday-ish");
        assert_eq!(
            event.event_time_secs(),
            Err(TimestampError("yesterday-ish".to_string()))
        );
    }

    #[test]
    fn test_metadata_wins_over_trace() {
        let mut event = event_with_created_at("2024-05-01 12:30:45");
        event.metadata = Some(EventMetadata {
            city: Some("Lisbon".to_string()),
            ..Default::default()
        });
        let trace = AttributionTrace {
            city: Some("Porto".to_string()),
            country: Some("PT".to_string()),
            ..Default::default()
        };

        let sources = FieldSources::new(&event, &trace);
        assert_eq!(sources.city(), Some("Lisbon"));
        // No metadata country: the trace value backfills.
        assert_eq!(sources.country(), Some("PT"));
        // Present in neither: omitted.
        assert_eq!(sources.email(), None);
    }
}
