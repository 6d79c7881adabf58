use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::model::Link;
use crate::schedule;

pub const TEXT_PLACEHOLDER: &str = "Untitled Link";
pub const URL_PLACEHOLDER: &str = "about:blank";

// Pre-versioned records carried a single free-text reminder field.
const LEGACY_SCHEDULED_FIELD: &str = "scheduledTime";

/// Brings one decoded record up to the current schema.
///
/// Applied independently to every element the store loads. Safe on
/// arbitrary shapes: wrong-typed fields fall back rather than fail, the
/// legacy reminder field is converted best-effort and never survives, and
/// an unparseable reminder instant is cleared rather than carried forward.
/// Idempotent on already-normalized records.
pub fn normalize(raw: &Value, now: OffsetDateTime) -> Link {
    let text = string_field(raw, "text").unwrap_or_else(|| TEXT_PLACEHOLDER.to_string());
    let url = string_field(raw, "url").unwrap_or_else(|| URL_PLACEHOLDER.to_string());
    let date_added = integer_field(raw, "dateAdded")
        .filter(|millis| *millis >= 0)
        .unwrap_or(0);

    let mut scheduled_time_display = string_field(raw, "scheduledTimeDisplay");
    let actual_raw = raw
        .get("scheduledDateTimeActual")
        .filter(|value| !value.is_null());
    let mut scheduled_at = actual_raw
        .and_then(Value::as_str)
        .and_then(parse_instant);

    if actual_raw.is_none() {
        if let Some(legacy) = string_field(raw, LEGACY_SCHEDULED_FIELD) {
            scheduled_at = schedule::parse_relative(&legacy, now);
            if scheduled_time_display.is_none() {
                scheduled_time_display = Some(legacy);
            }
        }
    }

    Link {
        text,
        url,
        date_added,
        scheduled_time_display,
        scheduled_at,
    }
}

fn string_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}

fn integer_field(raw: &Value, key: &str) -> Option<i64> {
    let value = raw.get(key)?;
    if let Some(millis) = value.as_i64() {
        return Some(millis);
    }
    value
        .as_f64()
        .filter(|millis| millis.is_finite())
        .map(|millis| millis.trunc() as i64)
}

fn parse_instant(value: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(value, &Rfc3339)
        .ok()
        .map(|instant| instant.to_offset(UtcOffset::UTC))
}
