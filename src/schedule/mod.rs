use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use time::{Duration, OffsetDateTime};

// `<number>[.<decimal>] <unit>[s] <suffix>` with arbitrary interior
// whitespace. Unit aliases: hr -> hour, min -> minute.
static RELATIVE_EXPR: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(
        r"^\s*(\d+(?:\.\d+)?)\s+(hours?|hrs?|minutes?|mins?|days?)\s+(from\s+now|later|hence)\s*$",
    )
    .case_insensitive(true)
    .build()
    .expect("valid relative time pattern")
});

const SECONDS_PER_MINUTE: f64 = 60.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Resolves a free-text reminder phrase ("2.5 hours from now") against the
/// supplied instant, using calendar-agnostic duration arithmetic.
///
/// `None` means the input is not a relative time expression. That is the
/// documented no-match signal, not an error: callers fall back to keeping
/// the text verbatim and must not set an absolute timestamp.
pub fn parse_relative(input: &str, now: OffsetDateTime) -> Option<OffsetDateTime> {
    let captures = RELATIVE_EXPR.captures(input)?;
    let value: f64 = captures[1].parse().ok()?;
    let unit = captures[2].to_ascii_lowercase();
    let seconds = if unit.starts_with("min") {
        value * SECONDS_PER_MINUTE
    } else if unit.starts_with("hour") || unit.starts_with("hr") {
        value * SECONDS_PER_HOUR
    } else {
        value * SECONDS_PER_DAY
    };
    now.checked_add(Duration::checked_seconds_f64(seconds)?)
}
