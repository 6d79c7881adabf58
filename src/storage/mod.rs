use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use time::OffsetDateTime;

use crate::config::{ConfigPaths, StorageOptions};
use crate::model::Link;
use crate::sort::SortCriterion;

pub mod migrate;
mod schema;

const LINKS_KEY: &str = "links";
const SORT_CRITERIA_KEY: &str = "sortCriteria";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("key-value store access failed: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("encoding link collection failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Handle to the synchronous key-value store backing the link collection.
///
/// The public operations never surface storage failures: loads fall back
/// to defaults and writes report to the log channel, so callers always
/// keep a valid in-memory collection.
#[derive(Clone)]
pub struct StoreHandle {
    db_path: Arc<PathBuf>,
    options: Arc<StorageOptions>,
}

impl StoreHandle {
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    /// Reads the persisted collection, bringing every record up to the
    /// current schema. A missing key, invalid JSON, a non-array payload,
    /// or a store read failure all yield the fixed seed collection.
    pub fn load_links(&self) -> Vec<Link> {
        let raw = match self.read_value(LINKS_KEY) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(%err, "failed to read link collection, using seed links");
                return seed_links();
            }
        };
        let Some(raw) = raw else {
            return seed_links();
        };
        let decoded: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::warn!(%err, "persisted link collection is not valid JSON, using seed links");
                return seed_links();
            }
        };
        let Some(entries) = decoded.as_array() else {
            tracing::warn!("persisted link collection is not an array, using seed links");
            return seed_links();
        };
        let now = OffsetDateTime::now_utc();
        entries
            .iter()
            .map(|entry| migrate::normalize(entry, now))
            .collect()
    }

    /// Overwrites the persisted collection with the full in-memory state.
    /// Failures are reported on the log channel and swallowed; the
    /// in-memory collection stays authoritative.
    pub fn save_links(&self, links: &[Link]) {
        if let Err(err) = self.try_save_links(links) {
            tracing::warn!(%err, "failed to persist link collection");
        }
    }

    pub fn load_sort_criterion(&self, default: SortCriterion) -> SortCriterion {
        let stored = match self.read_value(SORT_CRITERIA_KEY) {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(%err, "failed to read sort criterion, using default");
                return default;
            }
        };
        match stored {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(criterion = %raw, "unknown sort criterion in store, using default");
                default
            }),
            None => default,
        }
    }

    pub fn save_sort_criterion(&self, criterion: SortCriterion) {
        if let Err(err) = self.write_value(SORT_CRITERIA_KEY, &criterion.to_string()) {
            tracing::warn!(%err, "failed to persist sort criterion");
        }
    }

    fn try_save_links(&self, links: &[Link]) -> Result<(), StoreError> {
        let json = serde_json::to_string(links)?;
        self.write_value(LINKS_KEY, &json)
    }

    fn read_value(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.open()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn open(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&*self.db_path)?;
        prepare_connection(&conn, &self.options)?;
        Ok(conn)
    }
}

/// First-run collection, matching the set the manager has always shipped
/// with. A constant, so fallback loads stay deterministic.
pub fn seed_links() -> Vec<Link> {
    let mut first = Link::new("Google Search", "https://www.google.com", 0);
    first.scheduled_time_display = Some("Tomorrow AM".to_string());
    vec![
        first,
        Link::new("Wikipedia Encyclopedia", "https://www.wikipedia.org", 0),
        Link::new("Example Domain Info", "https://www.example.com", 0),
        Link::new("Developer Mozilla", "https://developer.mozilla.org", 0),
    ]
}

pub fn init(paths: &ConfigPaths, storage: &StorageOptions) -> Result<StoreHandle> {
    let db_path = &paths.database_path;
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }
    let conn = Connection::open(db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;
    prepare_connection(&conn, storage).context("preparing store connection")?;
    schema::apply(&conn)?;
    Ok(StoreHandle {
        db_path: Arc::new(db_path.clone()),
        options: Arc::new(storage.clone()),
    })
}

fn prepare_connection(conn: &Connection, storage: &StorageOptions) -> rusqlite::Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(
        None,
        "wal_autocheckpoint",
        storage.wal_autocheckpoint.to_string(),
    )?;
    Ok(())
}
