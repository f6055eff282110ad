use std::fmt;
use std::str::FromStr;

use serde::{de::Visitor, Deserialize, Serialize};
use thiserror::Error;

/// The five advertising destinations this engine can replicate to.
///
/// The set is closed on purpose: adapters are dispatched by exhaustive
/// matching, so adding a destination is a compile-time event, not a
/// configuration one.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Platform {
    Facebook,
    TikTok,
    Reddit,
    Pinterest,
    Kwai,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Facebook,
        Platform::TikTok,
        Platform::Reddit,
        Platform::Pinterest,
        Platform::Kwai,
    ];
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("{0} is not a known destination platform")]
pub struct ParsePlatformError(String);

/// Allow casting `Platform` from strings.
impl FromStr for Platform {
    type Err = ParsePlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "facebook" => Ok(Platform::Facebook),
            "tiktok" => Ok(Platform::TikTok),
            "reddit" => Ok(Platform::Reddit),
            "pinterest" => Ok(Platform::Pinterest),
            "kwai" => Ok(Platform::Kwai),
            invalid => Err(ParsePlatformError(invalid.to_owned())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Platform::Facebook => write!(f, "facebook"),
            Platform::TikTok => write!(f, "tiktok"),
            Platform::Reddit => write!(f, "reddit"),
            Platform::Pinterest => write!(f, "pinterest"),
            Platform::Kwai => write!(f, "kwai"),
        }
    }
}

struct PlatformVisitor;

impl<'de> Visitor<'de> for PlatformVisitor {
    type Value = Platform;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "the string representation of Platform")
    }

    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        match Platform::from_str(s) {
            Ok(platform) => Ok(platform),
            Err(_) => Err(serde::de::Error::invalid_value(
                serde::de::Unexpected::Str(s),
                &self,
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(PlatformVisitor)
    }
}

impl Serialize for Platform {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_round_trips_through_strings() {
        for platform in Platform::ALL {
            let parsed = Platform::from_str(&platform.to_string()).unwrap();
            assert_eq!(parsed, platform);
        }
    }

    #[test]
    fn test_platform_parse_is_case_insensitive() {
        assert_eq!(Platform::from_str("TikTok").unwrap(), Platform::TikTok);
        assert_eq!(Platform::from_str("FACEBOOK").unwrap(), Platform::Facebook);
    }

    #[test]
    fn test_unknown_platform_is_rejected() {
        assert!(Platform::from_str("snapchat").is_err());
    }
}
