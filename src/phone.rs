// Phone number handling for Brazilian WhatsApp numbers
//
// Customers type their number in many shapes: with or without the 55 country code and
// with or without the mobile 9 after the area code. Lookups match on every spelling.

const COUNTRY_CODE: &str = "55";

/// Keeps only ASCII digits
pub fn digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Splits a Brazilian number into (area code, subscriber) when it looks like one
fn split_local(d: &str) -> Option<(&str, &str)> {
    let local = match d.len() {
        12 | 13 if d.starts_with(COUNTRY_CODE) => &d[2..],
        10 | 11 => d,
        _ => return None,
    };
    Some((&local[..2], &local[2..]))
}

/// Subscriber part with and without the mobile 9 prefix
fn subscriber_forms(subscriber: &str) -> (String, String) {
    match subscriber.len() {
        8 => (format!("9{}", subscriber), subscriber.to_string()),
        9 if subscriber.starts_with('9') => (subscriber.to_string(), subscriber[1..].to_string()),
        _ => (subscriber.to_string(), subscriber.to_string()),
    }
}

/// Candidate spellings of a phone number, input digits first, without duplicates
///
/// A Brazilian number produces up to four variants:
/// `55 + DDD + 9 + N`, `55 + DDD + N`, `DDD + 9 + N`, `DDD + N`.
pub fn variants(raw: &str) -> Vec<String> {
    let d = digits(raw);
    if d.is_empty() {
        return Vec::new();
    }

    let mut out = vec![d.clone()];
    if let Some((area, subscriber)) = split_local(&d) {
        let (with_nine, without_nine) = subscriber_forms(subscriber);
        let candidates = [
            format!("{}{}{}", COUNTRY_CODE, area, with_nine),
            format!("{}{}{}", COUNTRY_CODE, area, without_nine),
            format!("{}{}", area, with_nine),
            format!("{}{}", area, without_nine),
        ];
        for candidate in candidates {
            if !out.contains(&candidate) {
                out.push(candidate);
            }
        }
    }
    out
}

/// Canonical storage form: 55 + DDD + subscriber, with the 9 restored on mobiles
///
/// Returns None when the input is not shaped like a Brazilian number.
pub fn canonical(raw: &str) -> Option<String> {
    let d = digits(raw);
    let (area, subscriber) = split_local(&d)?;
    let subscriber = match subscriber.chars().next() {
        Some('6'..='9') if subscriber.len() == 8 => format!("9{}", subscriber),
        _ => subscriber.to_string(),
    };
    Some(format!("{}{}{}", COUNTRY_CODE, area, subscriber))
}

/// Canonical form when available, otherwise the bare digits
pub fn normalize(raw: &str) -> String {
    canonical(raw).unwrap_or_else(|| digits(raw))
}

/// Extracts the phone number from a WhatsApp JID such as `5511999998888:3@s.whatsapp.net`
pub fn from_remote_jid(jid: &str) -> String {
    let user = jid.split('@').next().unwrap_or_default();
    let user = user.split(':').next().unwrap_or_default();
    digits(user)
}

/// Group chats use the `@g.us` server
pub fn is_group_jid(jid: &str) -> bool {
    jid.ends_with("@g.us")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_strips_formatting() {
        assert_eq!(digits("+55 (11) 99999-8888"), "5511999998888");
        assert_eq!(digits("abc"), "");
    }

    #[test]
    fn test_variants_full_mobile_number() {
        let v = variants("5511999998888");
        assert_eq!(
            v,
            vec![
                "5511999998888".to_string(),
                "551199998888".to_string(),
                "11999998888".to_string(),
                "1199998888".to_string(),
            ]
        );
    }

    #[test]
    fn test_variants_local_without_nine() {
        let v = variants("(11) 9999-8888");
        assert_eq!(v[0], "1199998888");
        assert!(v.contains(&"5511999998888".to_string()));
        assert!(v.contains(&"11999998888".to_string()));
        assert_eq!(v.len(), 4);
    }

    #[test]
    fn test_variants_non_brazilian_number_is_passthrough() {
        assert_eq!(variants("+44 20 7946 0958"), vec!["442079460958".to_string()]);
    }

    #[test]
    fn test_variants_empty_input() {
        assert!(variants("--").is_empty());
    }

    #[test]
    fn test_variants_nine_digit_subscriber_not_mobile() {
        // nine digits that do not start with 9 cannot lose a digit
        let v = variants("11812345678");
        assert_eq!(v, vec!["11812345678".to_string(), "5511812345678".to_string()]);
    }

    #[test]
    fn test_canonical_restores_mobile_nine() {
        assert_eq!(canonical("11 9999-8888").as_deref(), Some("5511999998888"));
        assert_eq!(canonical("5511999998888").as_deref(), Some("5511999998888"));
    }

    #[test]
    fn test_canonical_keeps_landline() {
        assert_eq!(canonical("1133334444").as_deref(), Some("551133334444"));
    }

    #[test]
    fn test_canonical_rejects_short_numbers() {
        assert_eq!(canonical("12345"), None);
        assert_eq!(normalize("12345"), "12345");
    }

    #[test]
    fn test_from_remote_jid() {
        assert_eq!(from_remote_jid("5511999998888@s.whatsapp.net"), "5511999998888");
        assert_eq!(from_remote_jid("5511999998888:12@s.whatsapp.net"), "5511999998888");
        assert_eq!(from_remote_jid("5511999998888@c.us"), "5511999998888");
    }

    #[test]
    fn test_group_jid_detection() {
        assert!(is_group_jid("120363025246125486@g.us"));
        assert!(!is_group_jid("5511999998888@s.whatsapp.net"));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Same subscriber written with and without country code / mobile 9 always matches
    #[test]
    fn prop_spellings_share_a_variant() {
        proptest!(|(
            area in 11u32..=99,
            subscriber in 60_000_000u32..=99_999_999,
            with_country in any::<bool>(),
            with_nine in any::<bool>()
        )| {
            let short = format!("{}{}", area, subscriber);
            let long = format!(
                "{}{}{}{}",
                if with_country { "55" } else { "" },
                area,
                if with_nine { "9" } else { "" },
                subscriber
            );
            let a = variants(&short);
            let b = variants(&long);
            prop_assert!(a.iter().any(|x| b.contains(x)), "{:?} vs {:?}", a, b);
            prop_assert_eq!(canonical(&short), canonical(&long));
        });
    }

    /// Variant lists never contain duplicates and never exceed five entries
    #[test]
    fn prop_variants_are_unique() {
        proptest!(|(raw in "[0-9 ()+-]{0,20}")| {
            let v = variants(&raw);
            prop_assert!(v.len() <= 5);
            let mut sorted = v.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), v.len());
        });
    }
}
