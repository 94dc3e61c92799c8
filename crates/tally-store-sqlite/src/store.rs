//! [`SqliteStore`] — the SQLite implementation of [`VisitStore`].

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::OptionalExtension as _;

use tally_core::{
  civil::raw_retention_cutoff,
  stats::{DailyCount, TagRecord, TagStats, TagSummary},
  store::VisitStore,
};

use crate::{
  Error, Result,
  encode::{RawTag, decode_date, encode_date, encode_datetime},
  schema,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A visit store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and bring its schema up to date.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.migrate().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.migrate().await?;
    Ok(store)
  }

  async fn migrate(&self) -> Result<()> {
    let version = self
      .conn
      .call(|conn| {
        conn.execute_batch(schema::PRAGMAS)?;
        Ok(schema::migrate(conn)?)
      })
      .await?;

    let known = schema::MIGRATIONS.len() as i64;
    if version > known {
      return Err(Error::Migration(format!(
        "database is at schema version {version}, newest known is {known}"
      )));
    }
    Ok(())
  }
}

// ─── VisitStore impl ─────────────────────────────────────────────────────────

impl VisitStore for SqliteStore {
  type Error = Error;

  // ── Tag registry ──────────────────────────────────────────────────────────

  async fn find_tag(&self, tag: &str) -> Result<Option<TagRecord>> {
    let tag = tag.to_owned();

    let raw: Option<RawTag> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT tag_id, tag, last_compacted_on FROM tags WHERE tag = ?1",
              rusqlite::params![tag],
              |row| {
                Ok(RawTag {
                  tag_id:            row.get(0)?,
                  tag:               row.get(1)?,
                  last_compacted_on: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTag::into_record).transpose()
  }

  async fn resolve_or_create_tag(
    &self,
    tag: &str,
    today: NaiveDate,
  ) -> Result<TagRecord> {
    let tag = tag.to_owned();
    let today_str = encode_date(today);

    // Insert-or-ignore, then re-read: two concurrent creates of the same
    // string converge on whichever row won the unique constraint. The
    // stamp only applies to the insert — an existing row keeps its own.
    let raw: RawTag = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO tags (tag, last_compacted_on) VALUES (?1, ?2)
           ON CONFLICT(tag) DO NOTHING",
          rusqlite::params![tag, today_str],
        )?;

        Ok(conn.query_row(
          "SELECT tag_id, tag, last_compacted_on FROM tags WHERE tag = ?1",
          rusqlite::params![tag],
          |row| {
            Ok(RawTag {
              tag_id:            row.get(0)?,
              tag:               row.get(1)?,
              last_compacted_on: row.get(2)?,
            })
          },
        )?)
      })
      .await?;

    raw.into_record()
  }

  async fn list_tags(&self) -> Result<Vec<TagRecord>> {
    let raws: Vec<RawTag> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT tag_id, tag, last_compacted_on FROM tags ORDER BY tag_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawTag {
              tag_id:            row.get(0)?,
              tag:               row.get(1)?,
              last_compacted_on: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTag::into_record).collect()
  }

  // ── Visit recording ───────────────────────────────────────────────────────

  async fn record_visit(&self, tag_id: i64, at: NaiveDateTime) -> Result<()> {
    let at_str = encode_datetime(at);
    let on_str = encode_date(at.date());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO visits (tag_id, visited_at, visited_on)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![tag_id, at_str, on_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Compaction ────────────────────────────────────────────────────────────

  async fn compact_tag(&self, tag_id: i64, today: NaiveDate) -> Result<()> {
    let today_str = encode_date(today);
    let cutoff_str = encode_date(raw_retention_cutoff(today));

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Fold every pre-today date into its aggregate. A date already
        // aggregated is skipped, so a re-run cannot double-count.
        tx.execute(
          "INSERT OR IGNORE INTO daily_hits (tag_id, day, hits)
           SELECT tag_id, visited_on, COUNT(*)
           FROM visits
           WHERE tag_id = ?1 AND visited_on < ?2
           GROUP BY visited_on",
          rusqlite::params![tag_id, today_str],
        )?;

        // Prune only past the retention window; rows between the cutoff
        // and today stay raw to feed the dashboard's daily series. Totals
        // read aggregates plus today only, so the overlap is never
        // double-counted.
        tx.execute(
          "DELETE FROM visits WHERE tag_id = ?1 AND visited_on < ?2",
          rusqlite::params![tag_id, cutoff_str],
        )?;

        tx.execute(
          "UPDATE tags SET last_compacted_on = ?2 WHERE tag_id = ?1",
          rusqlite::params![tag_id, today_str],
        )?;

        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Stats reads ───────────────────────────────────────────────────────────

  async fn tag_stats(&self, tag_id: i64, today: NaiveDate) -> Result<TagStats> {
    let today_str = encode_date(today);

    let (aggregated, today_hits): (i64, i64) = self
      .conn
      .call(move |conn| {
        let aggregated: i64 = conn.query_row(
          "SELECT COALESCE(SUM(hits), 0) FROM daily_hits WHERE tag_id = ?1",
          rusqlite::params![tag_id],
          |row| row.get(0),
        )?;

        let today_hits: i64 = conn.query_row(
          "SELECT COUNT(*) FROM visits WHERE tag_id = ?1 AND visited_on = ?2",
          rusqlite::params![tag_id, today_str],
          |row| row.get(0),
        )?;

        Ok((aggregated, today_hits))
      })
      .await?;

    Ok(TagStats {
      total_hits: (aggregated + today_hits) as u64,
      today_hits: today_hits as u64,
    })
  }

  async fn daily_series(
    &self,
    tag_id: i64,
    today: NaiveDate,
    window_days: u32,
  ) -> Result<Vec<DailyCount>> {
    let since_str =
      encode_date(today - chrono::Days::new(u64::from(window_days)));
    let today_str = encode_date(today);

    let rows: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT visited_on, COUNT(*)
           FROM visits
           WHERE tag_id = ?1 AND visited_on > ?2 AND visited_on <= ?3
           GROUP BY visited_on
           ORDER BY visited_on",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![tag_id, since_str, today_str], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(day, hits)| {
        Ok(DailyCount { day: decode_date(&day)?, hits: hits as u64 })
      })
      .collect()
  }

  async fn all_tags_summary(
    &self,
    today: NaiveDate,
  ) -> Result<Vec<TagSummary>> {
    let today_str = encode_date(today);

    let rows: Vec<(String, i64, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             t.tag,
             COALESCE(a.hits, 0) + COALESCE(r.hits, 0) AS total_hits,
             COALESCE(r.hits, 0)                       AS today_hits
           FROM tags t
           LEFT JOIN (SELECT tag_id, SUM(hits) AS hits
                      FROM daily_hits GROUP BY tag_id) a
             ON a.tag_id = t.tag_id
           LEFT JOIN (SELECT tag_id, COUNT(*) AS hits
                      FROM visits WHERE visited_on = ?1 GROUP BY tag_id) r
             ON r.tag_id = t.tag_id
           ORDER BY total_hits DESC, t.tag ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![today_str], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(tag, total, today_hits)| TagSummary {
          tag,
          total_hits: total as u64,
          today_hits: today_hits as u64,
        })
        .collect(),
    )
  }
}
