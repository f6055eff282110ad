//! Opportunistic device inference from user-agent strings.
//!
//! Pinterest accepts device/OS context alongside an event. When the
//! ingestion layer did not record it explicitly, we infer what we safely can
//! from the attributed user-agent; anything unrecognizable stays `None` and
//! the deep-clean drops the field.

/// Device context parsed out of a user-agent header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub device_type: Option<&'static str>,
    pub brand: Option<&'static str>,
    pub model: Option<String>,
    pub os_version: Option<String>,
}

impl DeviceInfo {
    /// Parse a user-agent string into device context. Best-effort: only
    /// patterns we can classify confidently produce values.
    pub fn parse(user_agent: Option<&str>) -> Self {
        let Some(ua) = user_agent else {
            return Self::default();
        };

        if ua.is_empty() {
            return Self::default();
        }

        if ua.contains("iPhone") {
            return Self {
                device_type: Some("mobile"),
                brand: Some("Apple"),
                model: Some("iPhone".to_string()),
                os_version: ios_version(ua),
            };
        }

        if ua.contains("iPad") {
            return Self {
                device_type: Some("tablet"),
                brand: Some("Apple"),
                model: Some("iPad".to_string()),
                os_version: ios_version(ua),
            };
        }

        if ua.contains("Android") {
            let device_type = if ua.contains("Tablet") || !ua.contains("Mobile") {
                "tablet"
            } else {
                "mobile"
            };
            let model = android_model(ua);
            let brand = model.as_deref().and_then(android_brand);
            return Self {
                device_type: Some(device_type),
                brand,
                model,
                os_version: version_after(ua, "Android "),
            };
        }

        if ua.contains("Windows NT") {
            return Self {
                device_type: Some("desktop"),
                brand: None,
                model: None,
                os_version: version_after(ua, "Windows NT "),
            };
        }

        if ua.contains("Mac OS X") {
            return Self {
                device_type: Some("desktop"),
                brand: Some("Apple"),
                model: None,
                os_version: version_after(ua, "Mac OS X ").map(|v| v.replace('_', ".")),
            };
        }

        if ua.contains("Linux") {
            return Self {
                device_type: Some("desktop"),
                ..Self::default()
            };
        }

        Self::default()
    }
}

/// iOS reports versions as `iPhone OS 16_5` / `CPU OS 15_2`.
fn ios_version(ua: &str) -> Option<String> {
    version_after(ua, "iPhone OS ")
        .or_else(|| version_after(ua, "CPU OS "))
        .map(|v| v.replace('_', "."))
}

/// Take the version-looking token following `marker`.
fn version_after(ua: &str, marker: &str) -> Option<String> {
    let rest = &ua[ua.find(marker)? + marker.len()..];
    let version: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '_')
        .collect();
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}

/// Android user-agents carry the model in the parenthesized section, e.g.
/// `(Linux; Android 13; SM-G991B Build/TP1A...)`.
fn android_model(ua: &str) -> Option<String> {
    let start = ua.find('(')? + 1;
    let end = ua[start..].find(')')? + start;
    let section = &ua[start..end];

    let mut parts = section.split("; ").skip_while(|p| !p.starts_with("Android"));
    parts.next()?; // the "Android <version>" element itself
    let candidate = parts.next()?;
    let model = candidate
        .split(" Build")
        .next()
        .unwrap_or(candidate)
        .trim()
        .to_string();
    if model.is_empty() {
        None
    } else {
        Some(model)
    }
}

fn android_brand(model: &str) -> Option<&'static str> {
    if model.starts_with("SM-") || model.contains("Samsung") {
        Some("Samsung")
    } else if model.starts_with("Pixel") {
        Some("Google")
    } else if model.starts_with("Redmi") || model.starts_with("Mi ") {
        Some("Xiaomi")
    } else {
        None
    }
}

/// Primary language tag of an `Accept-Language` header: `en-US,en;q=0.9`
/// yields `en`.
pub fn language_from_accept(accept_language: &str) -> Option<String> {
    let first = accept_language.split(',').next()?.split(';').next()?.trim();
    let tag = first.split('-').next()?.to_lowercase();
    if tag.is_empty() || tag == "*" {
        None
    } else {
        Some(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        "Mozilla/5.0 (iPhone; CPU iPhone OS 16_5 like Mac OS X) AppleWebKit/605.1.15",
        Some("mobile"),
        Some("Apple"),
        Some("iPhone"),
        Some("16.5")
    )]
    #[case(
        "Mozilla/5.0 (iPad; CPU OS 15_2 like Mac OS X) AppleWebKit/605.1.15",
        Some("tablet"),
        Some("Apple"),
        Some("iPad"),
        Some("15.2")
    )]
    #[case(
        "Mozilla/5.0 (Linux; Android 13; SM-G991B Build/TP1A.220624.014) Mobile Safari/537.36",
        Some("mobile"),
        Some("Samsung"),
        Some("SM-G991B"),
        Some("13")
    )]
    #[case(
        "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 Mobile",
        Some("mobile"),
        Some("Google"),
        Some("Pixel 8"),
        Some("14")
    )]
    #[case(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
        Some("desktop"),
        None,
        None,
        Some("10.0")
    )]
    #[case(
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36",
        Some("desktop"),
        Some("Apple"),
        None,
        Some("10.15.7")
    )]
    fn test_parse_user_agents(
        #[case] ua: &str,
        #[case] device_type: Option<&str>,
        #[case] brand: Option<&str>,
        #[case] model: Option<&str>,
        #[case] os_version: Option<&str>,
    ) {
        let info = DeviceInfo::parse(Some(ua));
        assert_eq!(info.device_type, device_type);
        assert_eq!(info.brand, brand);
        assert_eq!(info.model.as_deref(), model);
        assert_eq!(info.os_version.as_deref(), os_version);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("curl/7.68.0"))]
    fn test_unrecognized_user_agents_yield_nothing(#[case] ua: Option<&str>) {
        assert_eq!(DeviceInfo::parse(ua), DeviceInfo::default());
    }

    #[rstest]
    #[case("en-US,en;q=0.9", Some("en"))]
    #[case("pt-BR", Some("pt"))]
    #[case("de", Some("de"))]
    #[case("*", None)]
    #[case("", None)]
    fn test_language_from_accept(#[case] header: &str, #[case] expected: Option<&str>) {
        assert_eq!(language_from_accept(header).as_deref(), expected);
    }
}
