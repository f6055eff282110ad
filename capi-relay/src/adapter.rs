use std::fmt;

use async_trait::async_trait;
use capi_common::clean::deep_clean;
use capi_common::event::{AttributionTrace, DestinationCredentials, RecordedEvent};
use capi_common::mapping::map_event;
use capi_common::platform::Platform;
use capi_common::redact::redact_paths;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::RelayError;

/// Why a delivery was skipped. Skips are expected outcomes, not failures:
/// one event fans out to several destinations independently and a
/// destination's ineligibility must never block the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The destination has no event type for this name and does not accept
    /// custom events.
    UnsupportedEvent { platform: Platform, event: String },
    /// The destination requires a click id and none is available outside
    /// test mode.
    MissingClickId { platform: Platform },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SkipReason::UnsupportedEvent { platform, event } => {
                write!(f, "{platform} does not accept event {event:?}")
            }
            SkipReason::MissingClickId { platform } => {
                write!(f, "{platform} requires a click id and none was attributed")
            }
        }
    }
}

/// Terminal state of one delivery attempt. Transport and construction
/// failures travel separately as `Err(RelayError)`.
#[derive(Debug)]
pub enum Delivery {
    /// The cleaned payload that was actually sent, for logging/auditing.
    Delivered(Value),
    Skipped(SkipReason),
}

impl Delivery {
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Delivery::Delivered(payload) => Some(payload),
            Delivery::Skipped(_) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Delivery::Skipped(_))
    }
}

/// Deduplication identifier the destination uses to avoid double counting.
///
/// A pure function of the mapped name, the trace reference and the
/// created_at-derived event time — rebuilding the same recorded event always
/// yields a byte-identical key.
pub fn dedup_event_id(event_name: &str, trace_id: &str, event_time_secs: i64) -> String {
    format!("{event_name}_{trace_id}_{event_time_secs}")
}

/// One destination's replication strategy. Adapters are stateless aside from
/// constant configuration, so concurrent calls against one instance are safe.
#[async_trait]
pub trait CapiAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// Dot-paths to strip from the built payload for a given destination
    /// event name. Most destinations reject nothing.
    fn exclusions(&self, _mapped_name: &str) -> Option<&'static [&'static str]> {
        None
    }

    /// Destination-specific eligibility check. An `Err` here becomes a
    /// `Skipped` outcome, never a failure.
    fn validate_event(
        &self,
        event: &RecordedEvent,
        trace: &AttributionTrace,
        test_mode: bool,
    ) -> Result<(), SkipReason>;

    /// Assemble the raw destination payload. Pure; may contain nulls that
    /// the deep-clean removes afterwards.
    fn build_payload(
        &self,
        event: &RecordedEvent,
        trace: &AttributionTrace,
        credentials: &DestinationCredentials,
        test_mode: bool,
    ) -> Result<Value, RelayError>;

    /// Issue the single outbound POST for an already-cleaned payload.
    async fn dispatch(
        &self,
        client: &reqwest::Client,
        credentials: &DestinationCredentials,
        test_mode: bool,
        payload: &Value,
    ) -> Result<(), RelayError>;

    /// The full delivery attempt: validate, build, redact excluded fields,
    /// deep-clean, send. Redaction always runs before cleaning.
    async fn send_event(
        &self,
        client: &reqwest::Client,
        event: &RecordedEvent,
        trace: &AttributionTrace,
        credentials: &DestinationCredentials,
        test_mode: bool,
    ) -> Result<Delivery, RelayError> {
        if let Err(reason) = self.validate_event(event, trace, test_mode) {
            warn!(
                platform = %self.platform(),
                event = %event.name,
                "skipping delivery: {}", reason
            );
            return Ok(Delivery::Skipped(reason));
        }

        let raw = self.build_payload(event, trace, credentials, test_mode)?;

        let mapping = map_event(self.platform(), &event.name);
        let redacted = match self.exclusions(&mapping.name) {
            Some(paths) => redact_paths(&raw, paths),
            None => raw,
        };
        let payload = deep_clean(redacted);

        debug!(platform = %self.platform(), event = %event.name, "built destination payload");

        self.dispatch(client, credentials, test_mode, &payload)
            .await?;

        Ok(Delivery::Delivered(payload))
    }
}

/// Resolve the destination account identifier or fail before any network
/// call is made.
pub(crate) fn require_pixel_id<'c>(
    platform: Platform,
    credentials: &'c DestinationCredentials,
) -> Result<&'c str, RelayError> {
    credentials
        .pixel_id
        .as_deref()
        .ok_or(RelayError::MissingPixelId(platform))
}

/// Execute a prepared request and map the outcome into the relay error
/// taxonomy. Non-2xx responses are logged with the destination's body and
/// re-raised; nothing is retried here.
pub(crate) async fn post_json(
    platform: Platform,
    request: reqwest::RequestBuilder,
) -> Result<(), RelayError> {
    let response = request
        .send()
        .await
        .map_err(|source| RelayError::Transport { platform, source })?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    error!(%platform, %status, %body, "destination rejected conversion event");
    Err(RelayError::Rejected {
        platform,
        status,
        body,
    })
}
