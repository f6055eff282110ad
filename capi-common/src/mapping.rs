//! Translation of canonical event names into each destination's vocabulary.

use crate::platform::Platform;

/// Outcome of mapping a canonical event name for one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMapping {
    /// The name to send: the destination's translation for native events,
    /// the original canonical name for custom ones.
    pub name: String,
    /// Whether the event goes out through the destination's custom-event
    /// mechanism instead of a native event type.
    pub is_custom: bool,
    /// Whether the destination defines any translation for this canonical
    /// name at all.
    pub has_platform_mapping: bool,
}

/// Normalize a canonical name for vocabulary lookup: uppercase, separators
/// stripped. `"Init_Checkout"`, `"init-checkout"` and `"InitCheckout"` all
/// resolve to `INITCHECKOUT`.
pub fn normalize_canonical(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' ' | '.'))
        .collect::<String>()
        .to_uppercase()
}

fn is_standard(normalized: &str) -> bool {
    matches!(
        normalized,
        "PURCHASE"
            | "LEAD"
            | "COMPLETEREGISTRATION"
            | "ADDTOCART"
            | "ADDTOWISHLIST"
            | "PAGEVIEW"
            | "VIEWCONTENT"
            | "INITCHECKOUT"
            | "ADDPAYMENTINFO"
            | "SEARCH"
            | "SUBSCRIBE"
            | "CONTACT"
            | "STARTTRIAL"
    )
}

/// A destination's translation for a normalized standard name, if it defines
/// one. Closed world: unhandled arms mean "no native event type".
fn platform_translation(platform: Platform, normalized: &str) -> Option<&'static str> {
    match platform {
        Platform::Facebook => match normalized {
            "PURCHASE" => Some("Purchase"),
            "LEAD" => Some("Lead"),
            "COMPLETEREGISTRATION" => Some("CompleteRegistration"),
            "ADDTOCART" => Some("AddToCart"),
            "ADDTOWISHLIST" => Some("AddToWishlist"),
            "PAGEVIEW" => Some("PageView"),
            "VIEWCONTENT" => Some("ViewContent"),
            "INITCHECKOUT" => Some("InitiateCheckout"),
            "ADDPAYMENTINFO" => Some("AddPaymentInfo"),
            "SEARCH" => Some("Search"),
            "SUBSCRIBE" => Some("Subscribe"),
            "CONTACT" => Some("Contact"),
            "STARTTRIAL" => Some("StartTrial"),
            _ => None,
        },
        Platform::TikTok => match normalized {
            "PURCHASE" => Some("CompletePayment"),
            "LEAD" => Some("SubmitForm"),
            "COMPLETEREGISTRATION" => Some("CompleteRegistration"),
            "ADDTOCART" => Some("AddToCart"),
            "ADDTOWISHLIST" => Some("AddToWishlist"),
            "PAGEVIEW" => Some("Pageview"),
            "VIEWCONTENT" => Some("ViewContent"),
            "INITCHECKOUT" => Some("InitiateCheckout"),
            "ADDPAYMENTINFO" => Some("AddPaymentInfo"),
            "SEARCH" => Some("Search"),
            "SUBSCRIBE" => Some("Subscribe"),
            "CONTACT" => Some("Contact"),
            _ => None,
        },
        Platform::Reddit => match normalized {
            "PURCHASE" => Some("Purchase"),
            "LEAD" => Some("Lead"),
            "COMPLETEREGISTRATION" => Some("SignUp"),
            "ADDTOCART" => Some("AddToCart"),
            "ADDTOWISHLIST" => Some("AddToWishlist"),
            "PAGEVIEW" => Some("PageVisit"),
            "VIEWCONTENT" => Some("ViewContent"),
            "INITCHECKOUT" => Some("InitiateCheckout"),
            "SEARCH" => Some("Search"),
            _ => None,
        },
        Platform::Pinterest => match normalized {
            "PURCHASE" => Some("checkout"),
            "LEAD" => Some("lead"),
            "COMPLETEREGISTRATION" => Some("signup"),
            "ADDTOCART" => Some("add_to_cart"),
            "PAGEVIEW" => Some("page_visit"),
            "VIEWCONTENT" => Some("view_category"),
            "SEARCH" => Some("search"),
            _ => None,
        },
        Platform::Kwai => match normalized {
            "PURCHASE" => Some("EVENT_PURCHASE"),
            "LEAD" => Some("EVENT_FORM_SUBMIT"),
            "COMPLETEREGISTRATION" => Some("EVENT_COMPLETE_REGISTRATION"),
            "ADDTOCART" => Some("EVENT_ADD_TO_CART"),
            "PAGEVIEW" => Some("EVENT_PAGE_VIEW"),
            "VIEWCONTENT" => Some("EVENT_CONTENT_VIEW"),
            "INITCHECKOUT" => Some("EVENT_INITIATED_CHECKOUT"),
            "ADDPAYMENTINFO" => Some("EVENT_ADD_PAYMENT_INFO"),
            "SEARCH" => Some("EVENT_SEARCH"),
            _ => None,
        },
    }
}

/// Map a canonical event name into a destination's vocabulary.
///
/// Three-way outcome:
/// - not in the standard vocabulary: custom, name unchanged, no mapping;
/// - standard but the destination defines no translation: sent as custom
///   under the original name, `has_platform_mapping` is false;
/// - standard with a translation: native, translated name.
pub fn map_event(platform: Platform, canonical: &str) -> EventMapping {
    let normalized = normalize_canonical(canonical);

    if !is_standard(&normalized) {
        return EventMapping {
            name: canonical.to_owned(),
            is_custom: true,
            has_platform_mapping: false,
        };
    }

    match platform_translation(platform, &normalized) {
        Some(translated) => EventMapping {
            name: translated.to_owned(),
            is_custom: false,
            has_platform_mapping: true,
        },
        None => EventMapping {
            name: canonical.to_owned(),
            is_custom: true,
            has_platform_mapping: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("PURCHASE", "PURCHASE")]
    #[case("Purchase", "PURCHASE")]
    #[case("init_checkout", "INITCHECKOUT")]
    #[case("Init-Checkout", "INITCHECKOUT")]
    #[case("add to cart", "ADDTOCART")]
    #[case("page.view", "PAGEVIEW")]
    fn test_normalize_canonical(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_canonical(raw), expected);
    }

    #[rstest]
    #[case(Platform::Facebook, "PURCHASE", "Purchase")]
    #[case(Platform::TikTok, "PURCHASE", "CompletePayment")]
    #[case(Platform::Reddit, "PAGEVIEW", "PageVisit")]
    #[case(Platform::Pinterest, "PURCHASE", "checkout")]
    #[case(Platform::Kwai, "ADD_TO_CART", "EVENT_ADD_TO_CART")]
    fn test_standard_events_translate(
        #[case] platform: Platform,
        #[case] canonical: &str,
        #[case] expected: &str,
    ) {
        let mapping = map_event(platform, canonical);
        assert_eq!(mapping.name, expected);
        assert!(!mapping.is_custom);
        assert!(mapping.has_platform_mapping);
    }

    #[test]
    fn test_unknown_event_is_custom_everywhere() {
        for platform in Platform::ALL {
            let mapping = map_event(platform, "newsletter_scroll_75");
            assert_eq!(mapping.name, "newsletter_scroll_75");
            assert!(mapping.is_custom);
            assert!(!mapping.has_platform_mapping);
        }
    }

    #[test]
    fn test_standard_event_without_translation_falls_back_to_custom() {
        // Pinterest defines no native INITCHECKOUT event type.
        let mapping = map_event(Platform::Pinterest, "InitCheckout");
        assert_eq!(mapping.name, "InitCheckout");
        assert!(mapping.is_custom);
        assert!(!mapping.has_platform_mapping);
    }
}
