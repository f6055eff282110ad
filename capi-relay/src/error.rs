use capi_common::event::TimestampError;
use capi_common::platform::Platform;
use thiserror::Error;

/// Errors raised while building or delivering a destination payload.
///
/// Ineligibility (unsupported event type, Kwai's missing click id) is not an
/// error; it surfaces as `Delivery::Skipped` so sibling destinations keep
/// going.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error(transparent)]
    InvalidTimestamp(#[from] TimestampError),
    #[error("destination credentials for {0} are missing a pixel id")]
    MissingPixelId(Platform),
    #[error("failed to reach {platform}: {source}")]
    Transport {
        platform: Platform,
        #[source]
        source: reqwest::Error,
    },
    #[error("{platform} rejected the event with status {status}")]
    Rejected {
        platform: Platform,
        status: http::StatusCode,
        body: String,
    },
}
