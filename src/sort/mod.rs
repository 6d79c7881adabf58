use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::model::Link;

/// Named sort order applied to the collection. The serialized names are the
/// exact literals held in the store and the config file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum SortCriterion {
    #[serde(rename = "dateAdded_asc")]
    #[strum(serialize = "dateAdded_asc")]
    DateAddedAsc,
    #[serde(rename = "dateAdded_desc")]
    #[strum(serialize = "dateAdded_desc")]
    DateAddedDesc,
    #[serde(rename = "text_asc")]
    #[strum(serialize = "text_asc")]
    TextAsc,
    #[serde(rename = "text_desc")]
    #[strum(serialize = "text_desc")]
    TextDesc,
    #[serde(rename = "scheduledTime_asc")]
    #[strum(serialize = "scheduledTime_asc")]
    ScheduledTimeAsc,
    #[serde(rename = "scheduledTime_desc")]
    #[strum(serialize = "scheduledTime_desc")]
    ScheduledTimeDesc,
}

impl Default for SortCriterion {
    fn default() -> Self {
        SortCriterion::DateAddedDesc
    }
}

/// Stable in-place sort; ties keep their relative input order.
pub fn sort_links(links: &mut [Link], criterion: SortCriterion) {
    use SortCriterion::*;
    links.sort_by(|a, b| match criterion {
        DateAddedAsc => a.date_added.cmp(&b.date_added),
        DateAddedDesc => b.date_added.cmp(&a.date_added),
        TextAsc => collate(&a.text, &b.text),
        TextDesc => collate(&b.text, &a.text),
        ScheduledTimeAsc => compare_scheduled(a, b, false),
        ScheduledTimeDesc => compare_scheduled(a, b, true),
    });
}

// Having an actual reminder instant outranks having none in BOTH
// directions; only the instant/text comparison itself flips with the
// chosen direction. Do not rewrite this as a negated ascending compare.
fn compare_scheduled(a: &Link, b: &Link, descending: bool) -> Ordering {
    match (a.scheduled_at, b.scheduled_at) {
        (Some(x), Some(y)) => {
            if descending {
                y.cmp(&x)
            } else {
                x.cmp(&y)
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => {
            let x = a.scheduled_time_display.as_deref().unwrap_or("");
            let y = b.scheduled_time_display.as_deref().unwrap_or("");
            if descending {
                collate(y, x)
            } else {
                collate(x, y)
            }
        }
    }
}

fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}
