//! Title cache CRUD operations.
//!
//! Provides reads, upserts, and retention sweeps for resolved titles.
//! The primary key is the exact URL string that was requested.

use std::time::Duration;

use super::connection::CacheDb;
use crate::Error;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached resolution outcome.
///
/// `title` is `None` when the resolution failed; that outcome is cached too
/// so the page is not fetched again until the entry is swept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TitleEntry {
    pub url: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TitleEntry {
    pub fn new(url: impl Into<String>, title: Option<String>) -> Self {
        Self { url: url.into(), title, created_at: Utc::now() }
    }
}

fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

impl CacheDb {
    /// Insert or replace an entry, keeping its `created_at`.
    pub async fn upsert_entry(&self, entry: &TitleEntry) -> Result<(), Error> {
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO title_cache (url, title, created_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(url) DO UPDATE SET
                        title = excluded.title,
                        created_at = excluded.created_at",
                    params![&entry.url, &entry.title, entry.created_at.timestamp_millis()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store the outcome of a resolution, stamped with the current time.
    ///
    /// Overwrites any existing entry for `url`.
    pub async fn put_title(&self, url: &str, title: Option<&str>) -> Result<(), Error> {
        self.upsert_entry(&TitleEntry::new(url, title.map(str::to_string)))
            .await
    }

    /// Get the full entry for a URL.
    ///
    /// Returns None if the URL has never been cached (or was swept).
    pub async fn get_entry(&self, url: &str) -> Result<Option<TitleEntry>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<TitleEntry>, Error> {
                let result = conn.query_row(
                    "SELECT url, title, created_at FROM title_cache WHERE url = ?1",
                    params![url],
                    |row| {
                        Ok(TitleEntry {
                            url: row.get(0)?,
                            title: row.get(1)?,
                            created_at: millis_to_datetime(row.get(2)?),
                        })
                    },
                );

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Get the cached title for a URL.
    ///
    /// Absent both when nothing is cached and when a failed resolution is cached.
    pub async fn get_title(&self, url: &str) -> Result<Option<String>, Error> {
        Ok(self.get_entry(url).await?.and_then(|entry| entry.title))
    }

    /// Number of cached entries.
    pub async fn count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM title_cache", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete entries created before `now - retention`.
    ///
    /// Returns the number of deleted entries.
    pub async fn sweep(&self, retention: Duration) -> Result<u64, Error> {
        let cutoff = chrono::Duration::from_std(retention)
            .ok()
            .and_then(|retention| Utc::now().checked_sub_signed(retention))
            .ok_or_else(|| Error::InvalidInput(format!("retention out of range: {retention:?}")))?;
        self.sweep_older_than(cutoff).await
    }

    /// Delete entries created strictly before `cutoff`.
    pub async fn sweep_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        let cutoff_ms = cutoff.timestamp_millis();
        let (before, deleted) = self
            .conn
            .call(move |conn| -> Result<(i64, usize), Error> {
                let before: i64 = conn.query_row("SELECT COUNT(*) FROM title_cache", [], |row| row.get(0))?;
                let deleted = conn.execute("DELETE FROM title_cache WHERE created_at < ?1", params![cutoff_ms])?;
                Ok((before, deleted))
            })
            .await
            .map_err(Error::from)?;

        tracing::info!(
            before,
            after = before - deleted as i64,
            cutoff = %cutoff.to_rfc3339(),
            "swept title cache"
        );
        Ok(deleted as u64)
    }

    /// Delete entries whose URL contains `domain`.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_by_domain(&self, domain: &str) -> Result<u64, Error> {
        if domain.trim().is_empty() {
            return Err(Error::InvalidInput("domain cannot be empty".into()));
        }
        let pattern = format!("%{}%", domain.trim());
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM title_cache WHERE url LIKE ?1", params![pattern])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
