use anyhow::{bail, Result};
use time::OffsetDateTime;

use crate::model::Link;
use crate::schedule;
use crate::sort::{self, SortCriterion};
use crate::storage::StoreHandle;

/// Result of a reminder update, reported back to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ReminderOutcome {
    /// The phrase parsed as a relative expression; an absolute instant was set.
    Scheduled(OffsetDateTime),
    /// The phrase did not parse; it was kept as display-only text.
    DisplayOnly,
    Cleared,
    NotFound,
}

/// In-memory link collection plus the active sort order, backed by the
/// store. Every mutation persists the full collection and re-sorts before
/// returning, so callers can always render `links()` directly.
pub struct LinkBoard {
    store: StoreHandle,
    links: Vec<Link>,
    criterion: SortCriterion,
}

impl LinkBoard {
    pub fn load(store: StoreHandle, default_criterion: SortCriterion) -> Self {
        let mut links = store.load_links();
        let criterion = store.load_sort_criterion(default_criterion);
        sort::sort_links(&mut links, criterion);
        Self {
            store,
            links,
            criterion,
        }
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn criterion(&self) -> SortCriterion {
        self.criterion
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn add_link(&mut self, text: &str, url: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            bail!("link text cannot be empty");
        }
        let url = url.trim();
        if url.is_empty() {
            bail!("link URL cannot be empty");
        }
        let date_added = epoch_millis(OffsetDateTime::now_utc());
        self.links.push(Link::new(text, url, date_added));
        tracing::info!(text, url, "link added");
        self.commit();
        Ok(())
    }

    /// Removes the first record matching the `(url, text)` pair. Returns
    /// false when nothing matched.
    pub fn remove_link(&mut self, url: &str, text: &str) -> bool {
        let Some(index) = self.links.iter().position(|link| link.matches(url, text)) else {
            return false;
        };
        let removed = self.links.remove(index);
        tracing::info!(text = %removed.text, url = %removed.url, "link removed");
        self.commit();
        true
    }

    /// Sets or clears the reminder on the first matching record. `None`
    /// (or a blank phrase) clears both reminder fields; a phrase that does
    /// not parse as relative time is kept as display-only text.
    pub fn set_reminder(&mut self, url: &str, text: &str, input: Option<&str>) -> ReminderOutcome {
        let now = OffsetDateTime::now_utc();
        let Some(link) = self.links.iter_mut().find(|link| link.matches(url, text)) else {
            return ReminderOutcome::NotFound;
        };
        let outcome = match input.map(str::trim).filter(|phrase| !phrase.is_empty()) {
            Some(phrase) => match schedule::parse_relative(phrase, now) {
                Some(instant) => {
                    link.scheduled_time_display = Some(phrase.to_string());
                    link.scheduled_at = Some(instant);
                    ReminderOutcome::Scheduled(instant)
                }
                None => {
                    link.scheduled_time_display = Some(phrase.to_string());
                    link.scheduled_at = None;
                    ReminderOutcome::DisplayOnly
                }
            },
            None => {
                link.scheduled_time_display = None;
                link.scheduled_at = None;
                ReminderOutcome::Cleared
            }
        };
        tracing::info!(text, url, ?outcome, "reminder updated");
        self.commit();
        outcome
    }

    /// Direct timestamp entry: the instant becomes authoritative and the
    /// caller-formatted date string becomes the display text.
    pub fn set_reminder_at(
        &mut self,
        url: &str,
        text: &str,
        instant: OffsetDateTime,
        display: &str,
    ) -> ReminderOutcome {
        let Some(link) = self.links.iter_mut().find(|link| link.matches(url, text)) else {
            return ReminderOutcome::NotFound;
        };
        link.scheduled_time_display = Some(display.to_string());
        link.scheduled_at = Some(instant);
        tracing::info!(text, url, %instant, "reminder set to absolute time");
        self.commit();
        ReminderOutcome::Scheduled(instant)
    }

    pub fn set_criterion(&mut self, criterion: SortCriterion) {
        self.criterion = criterion;
        self.store.save_sort_criterion(criterion);
        sort::sort_links(&mut self.links, criterion);
    }

    fn commit(&mut self) {
        self.store.save_links(&self.links);
        sort::sort_links(&mut self.links, self.criterion);
    }
}

fn epoch_millis(instant: OffsetDateTime) -> i64 {
    (instant.unix_timestamp_nanos() / 1_000_000) as i64
}
