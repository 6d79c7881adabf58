use serde::Serialize;
use time::OffsetDateTime;

/// A single bookmark entry with scheduling metadata.
///
/// Field names on the wire are part of the persisted layout and must not
/// change. The struct is `Serialize`-only on purpose: the sole decoding
/// path is `storage::migrate::normalize`, which validates every field of
/// the raw payload before a `Link` exists. An invalid reminder instant
/// therefore cannot be represented in memory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub text: String,
    pub url: String,
    /// Epoch milliseconds, stamped once at creation and never mutated.
    /// Records predating the field carry `0` and sort as oldest.
    pub date_added: i64,
    /// Free-text reminder: the user's original phrase, an arbitrary note,
    /// or a formatted absolute date. Presentational only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time_display: Option<String>,
    /// Authoritative reminder instant, present only when the display text
    /// parsed as a relative expression or was entered as a timestamp.
    #[serde(
        rename = "scheduledDateTimeActual",
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_at: Option<OffsetDateTime>,
}

impl Link {
    pub fn new(text: impl Into<String>, url: impl Into<String>, date_added: i64) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
            date_added,
            scheduled_time_display: None,
            scheduled_at: None,
        }
    }

    /// Records carry no surrogate identifier; the `(url, text)` pair is the
    /// lookup key, so two identical pairs are indistinguishable.
    pub fn matches(&self, url: &str, text: &str) -> bool {
        self.url == url && self.text == text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn serializes_with_wire_field_names() {
        let mut link = Link::new("Example", "https://www.example.com", 1_700_000_000_000);
        link.scheduled_time_display = Some("2 hours from now".into());
        link.scheduled_at = Some(datetime!(2025-05-14 22:00:00 UTC));

        let json = serde_json::to_value(&link).expect("serialize link");
        assert_eq!(json["text"], "Example");
        assert_eq!(json["dateAdded"], 1_700_000_000_000_i64);
        assert_eq!(json["scheduledTimeDisplay"], "2 hours from now");
        assert_eq!(json["scheduledDateTimeActual"], "2025-05-14T22:00:00Z");
    }

    #[test]
    fn absent_reminder_fields_are_omitted() {
        let link = Link::new("Plain", "https://www.example.com", 0);
        let json = serde_json::to_value(&link).expect("serialize link");
        assert!(json.get("scheduledTimeDisplay").is_none());
        assert!(json.get("scheduledDateTimeActual").is_none());
    }

    #[test]
    fn matches_requires_both_url_and_text() {
        let link = Link::new("Docs", "https://developer.mozilla.org", 0);
        assert!(link.matches("https://developer.mozilla.org", "Docs"));
        assert!(!link.matches("https://developer.mozilla.org", "Other"));
        assert!(!link.matches("https://www.example.com", "Docs"));
    }
}
