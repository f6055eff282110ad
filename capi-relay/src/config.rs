use std::str::FromStr;
use std::time;

use envconfig::Envconfig;

/// Relay settings. Every field has a default, so `init_from_env` succeeds in
/// a bare environment; the base URLs exist to point adapters at regional
/// endpoints or a mock server.
#[derive(Envconfig, Clone)]
pub struct RelayConfig {
    #[envconfig(from = "CAPI_REQUEST_TIMEOUT_MS", default = "5000")]
    pub request_timeout: EnvMsDuration,

    #[envconfig(from = "CAPI_USER_AGENT", default = "capi-relay")]
    pub user_agent: String,

    #[envconfig(
        from = "CAPI_FACEBOOK_BASE_URL",
        default = "https://graph.facebook.com/v18.0"
    )]
    pub facebook_base_url: String,

    #[envconfig(
        from = "CAPI_TIKTOK_BASE_URL",
        default = "https://business-api.tiktok.com"
    )]
    pub tiktok_base_url: String,

    #[envconfig(
        from = "CAPI_REDDIT_BASE_URL",
        default = "https://ads-api.reddit.com/api/v2.0/conversions"
    )]
    pub reddit_base_url: String,

    #[envconfig(
        from = "CAPI_PINTEREST_BASE_URL",
        default = "https://api.pinterest.com/v5/ad_accounts"
    )]
    pub pinterest_base_url: String,

    /// Kwai uses one fixed ingestion endpoint; the account is identified in
    /// the body, not the path.
    #[envconfig(
        from = "CAPI_KWAI_ENDPOINT",
        default = "https://www.adsnebula.com/log/common/api"
    )]
    pub kwai_endpoint: String,
}

#[derive(Debug, Clone, Copy)]
pub struct EnvMsDuration(pub time::Duration);

#[derive(Debug, PartialEq, Eq)]
pub struct ParseEnvMsDurationError;

impl FromStr for EnvMsDuration {
    type Err = ParseEnvMsDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ms = s.parse::<u64>().map_err(|_| ParseEnvMsDurationError)?;

        Ok(EnvMsDuration(time::Duration::from_millis(ms)))
    }
}
