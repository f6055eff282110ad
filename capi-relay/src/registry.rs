use std::collections::HashMap;

use capi_common::event::{AttributionTrace, DestinationCredentials, RecordedEvent};
use capi_common::platform::Platform;
use futures::future::join_all;
use reqwest::header;

use crate::adapter::{CapiAdapter, Delivery};
use crate::adapters::{
    FacebookAdapter, KwaiAdapter, PinterestAdapter, RedditAdapter, TikTokAdapter,
};
use crate::config::RelayConfig;
use crate::error::RelayError;

/// Holds one adapter per destination and the shared HTTP client. Built once
/// and passed by reference; there is no global state.
pub struct CapiRegistry {
    adapters: HashMap<Platform, Box<dyn CapiAdapter>>,
    client: reqwest::Client,
}

impl CapiRegistry {
    pub fn new(config: &RelayConfig) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout.0)
            .build()
            .expect("failed to construct reqwest client for conversion relay");

        let mut adapters: HashMap<Platform, Box<dyn CapiAdapter>> = HashMap::new();
        adapters.insert(
            Platform::Facebook,
            Box::new(FacebookAdapter::new(config.facebook_base_url.clone())),
        );
        adapters.insert(
            Platform::TikTok,
            Box::new(TikTokAdapter::new(config.tiktok_base_url.clone())),
        );
        adapters.insert(
            Platform::Reddit,
            Box::new(RedditAdapter::new(config.reddit_base_url.clone())),
        );
        adapters.insert(
            Platform::Pinterest,
            Box::new(PinterestAdapter::new(config.pinterest_base_url.clone())),
        );
        adapters.insert(
            Platform::Kwai,
            Box::new(KwaiAdapter::new(config.kwai_endpoint.clone())),
        );

        Self { adapters, client }
    }

    fn adapter(&self, platform: Platform) -> &dyn CapiAdapter {
        self.adapters
            .get(&platform)
            .expect("every platform is registered at construction")
            .as_ref()
    }

    /// Replicate one recorded event to a single destination.
    pub async fn replicate(
        &self,
        platform: Platform,
        event: &RecordedEvent,
        trace: &AttributionTrace,
        credentials: &DestinationCredentials,
        test_mode: bool,
    ) -> Result<Delivery, RelayError> {
        self.adapter(platform)
            .send_event(&self.client, event, trace, credentials, test_mode)
            .await
    }

    /// Fan one event out to several destinations. Deliveries run
    /// concurrently with no defined ordering and no atomicity: each
    /// destination succeeds, is skipped, or fails on its own.
    pub async fn replicate_all(
        &self,
        targets: &[(Platform, DestinationCredentials)],
        event: &RecordedEvent,
        trace: &AttributionTrace,
        test_mode: bool,
    ) -> Vec<(Platform, Result<Delivery, RelayError>)> {
        let deliveries = targets.iter().map(|(platform, credentials)| async move {
            (
                *platform,
                self.replicate(*platform, event, trace, credentials, test_mode)
                    .await,
            )
        });

        join_all(deliveries).await
    }
}
