//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{NaiveDate, NaiveDateTime};
use tally_core::{stats::DailyCount, store::VisitStore};

use crate::{Error, SqliteStore, schema};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.expect("in-memory store")
}

fn d(s: &str) -> NaiveDate {
  s.parse().expect("test date")
}

fn dt(s: &str) -> NaiveDateTime {
  s.parse().expect("test datetime")
}

async fn visit_n(s: &SqliteStore, tag_id: i64, at: &str, n: usize) {
  for _ in 0..n {
    s.record_visit(tag_id, dt(at)).await.unwrap();
  }
}

// ─── Migrations ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn fresh_database_migrates_to_latest() {
  let conn = tokio_rusqlite::Connection::open_in_memory().await.unwrap();

  let first = conn
    .call(|conn| {
      conn.execute_batch(schema::PRAGMAS)?;
      Ok(schema::migrate(conn)?)
    })
    .await
    .unwrap();
  assert_eq!(first, schema::MIGRATIONS.len() as i64);

  // Re-running must be a no-op.
  let second = conn.call(|conn| Ok(schema::migrate(conn)?)).await.unwrap();
  assert_eq!(second, first);
}

#[tokio::test]
async fn v1_database_upgrades_in_place() {
  let conn = tokio_rusqlite::Connection::open_in_memory().await.unwrap();

  // Seed a database as the first schema version left it.
  conn
    .call(|conn| {
      conn.execute_batch(schema::PRAGMAS)?;
      let tx = conn.transaction()?;
      tx.execute_batch(schema::MIGRATIONS[0])?;
      tx.pragma_update(None, "user_version", 1)?;
      tx.commit()?;
      conn.execute("INSERT INTO tags (tag) VALUES ('legacy')", [])?;
      Ok(())
    })
    .await
    .unwrap();

  let (version, stamp) = conn
    .call(|conn| {
      let version = schema::migrate(conn)?;
      let stamp: Option<String> = conn.query_row(
        "SELECT last_compacted_on FROM tags WHERE tag = 'legacy'",
        [],
        |row| row.get(0),
      )?;
      Ok((version, stamp))
    })
    .await
    .unwrap();

  assert_eq!(version, schema::MIGRATIONS.len() as i64);
  assert_eq!(stamp, None, "pre-existing tags have no compaction stamp");
}

#[tokio::test]
async fn future_schema_is_rejected_at_open() {
  let dir = tempfile::tempdir().expect("temp dir");
  let path = dir.path().join("tally.db");

  // A database stamped by some newer build.
  let conn = tokio_rusqlite::Connection::open(&path).await.unwrap();
  conn
    .call(|conn| Ok(conn.pragma_update(None, "user_version", 99)?))
    .await
    .unwrap();
  drop(conn);

  let result = SqliteStore::open(&path).await;
  assert!(matches!(result, Err(Error::Migration(_))));
}

// ─── Tag registry ────────────────────────────────────────────────────────────

#[tokio::test]
async fn resolve_creates_on_first_sight() {
  let s = store().await;

  let record =
    s.resolve_or_create_tag("alpha", d("2024-01-01")).await.unwrap();
  assert_eq!(record.tag, "alpha");
  assert_eq!(record.last_compacted_on, Some(d("2024-01-01")));

  let found = s.find_tag("alpha").await.unwrap();
  assert_eq!(found, Some(record));
}

#[tokio::test]
async fn resolve_returns_existing_row() {
  let s = store().await;

  let first = s.resolve_or_create_tag("alpha", d("2024-01-01")).await.unwrap();
  let second =
    s.resolve_or_create_tag("alpha", d("2024-01-05")).await.unwrap();

  assert_eq!(second.tag_id, first.tag_id);
  // The creation-day stamp belongs to the surviving row; a later resolve
  // must not move it.
  assert_eq!(second.last_compacted_on, Some(d("2024-01-01")));
}

#[tokio::test]
async fn concurrent_resolves_converge_on_one_row() {
  let s = store().await;

  let (a, b) = tokio::join!(
    s.resolve_or_create_tag("alpha", d("2024-01-01")),
    s.resolve_or_create_tag("alpha", d("2024-01-01")),
  );

  assert_eq!(a.unwrap().tag_id, b.unwrap().tag_id);
  assert_eq!(s.list_tags().await.unwrap().len(), 1);
}

#[tokio::test]
async fn find_missing_tag_returns_none() {
  let s = store().await;
  assert!(s.find_tag("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn list_tags_in_registration_order() {
  let s = store().await;
  for tag in ["charlie", "alpha", "bravo"] {
    s.resolve_or_create_tag(tag, d("2024-01-01")).await.unwrap();
  }

  let names: Vec<String> =
    s.list_tags().await.unwrap().into_iter().map(|t| t.tag).collect();
  assert_eq!(names, ["charlie", "alpha", "bravo"]);
}

// ─── Stats reads ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn zero_visit_tag_reads_zero() {
  let s = store().await;
  let tag = s.resolve_or_create_tag("alpha", d("2024-01-01")).await.unwrap();

  let stats = s.tag_stats(tag.tag_id, d("2024-01-01")).await.unwrap();
  assert_eq!((stats.total_hits, stats.today_hits), (0, 0));

  let series =
    s.daily_series(tag.tag_id, d("2024-01-01"), 30).await.unwrap();
  assert!(series.is_empty());
}

#[tokio::test]
async fn same_day_visits_all_count() {
  let s = store().await;
  let tag = s.resolve_or_create_tag("alpha", d("2024-01-01")).await.unwrap();
  visit_n(&s, tag.tag_id, "2024-01-01T09:00:00", 3).await;

  let stats = s.tag_stats(tag.tag_id, d("2024-01-01")).await.unwrap();
  assert_eq!(stats.total_hits, 3);
  assert_eq!(stats.today_hits, 3);

  let series =
    s.daily_series(tag.tag_id, d("2024-01-01"), 30).await.unwrap();
  assert_eq!(series, vec![DailyCount { day: d("2024-01-01"), hits: 3 }]);
}

#[tokio::test]
async fn counts_span_the_compaction_boundary() {
  let s = store().await;
  let tag = s.resolve_or_create_tag("alpha", d("2024-01-01")).await.unwrap();
  visit_n(&s, tag.tag_id, "2024-01-01T09:00:00", 3).await;

  s.compact_tag(tag.tag_id, d("2024-01-02")).await.unwrap();
  visit_n(&s, tag.tag_id, "2024-01-02T10:00:00", 2).await;

  let stats = s.tag_stats(tag.tag_id, d("2024-01-02")).await.unwrap();
  assert_eq!(stats.total_hits, 5);
  assert_eq!(stats.today_hits, 2);

  let series =
    s.daily_series(tag.tag_id, d("2024-01-02"), 30).await.unwrap();
  assert_eq!(series, vec![
    DailyCount { day: d("2024-01-01"), hits: 3 },
    DailyCount { day: d("2024-01-02"), hits: 2 },
  ]);
}

#[tokio::test]
async fn series_left_boundary_is_exclusive() {
  let s = store().await;
  let tag = s.resolve_or_create_tag("alpha", d("2024-01-01")).await.unwrap();

  // A 30-day window ending 2024-03-01 covers (2024-01-31, 2024-03-01]:
  // the boundary day itself falls outside.
  visit_n(&s, tag.tag_id, "2024-01-31T12:00:00", 1).await;
  visit_n(&s, tag.tag_id, "2024-02-01T12:00:00", 1).await;

  let series =
    s.daily_series(tag.tag_id, d("2024-03-01"), 30).await.unwrap();
  assert_eq!(series, vec![DailyCount { day: d("2024-02-01"), hits: 1 }]);
}

// ─── Compaction ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn total_is_invariant_under_compaction() {
  let s = store().await;
  let tag = s.resolve_or_create_tag("alpha", d("2024-01-01")).await.unwrap();
  visit_n(&s, tag.tag_id, "2024-01-01T09:00:00", 3).await;

  let before = s.tag_stats(tag.tag_id, d("2024-01-01")).await.unwrap();
  assert_eq!(before.total_hits, 3);

  s.compact_tag(tag.tag_id, d("2024-01-02")).await.unwrap();

  let after = s.tag_stats(tag.tag_id, d("2024-01-02")).await.unwrap();
  assert_eq!(after.total_hits, 3);
  assert_eq!(after.today_hits, 0);

  let record = s.find_tag("alpha").await.unwrap().unwrap();
  assert_eq!(record.last_compacted_on, Some(d("2024-01-02")));
}

#[tokio::test]
async fn compaction_is_idempotent() {
  let s = store().await;
  let tag = s.resolve_or_create_tag("alpha", d("2024-01-01")).await.unwrap();
  visit_n(&s, tag.tag_id, "2024-01-01T09:00:00", 3).await;

  s.compact_tag(tag.tag_id, d("2024-01-02")).await.unwrap();
  let once = s.tag_stats(tag.tag_id, d("2024-01-02")).await.unwrap();

  s.compact_tag(tag.tag_id, d("2024-01-02")).await.unwrap();
  let twice = s.tag_stats(tag.tag_id, d("2024-01-02")).await.unwrap();

  assert_eq!(once, twice, "re-running compaction must not double-count");
}

#[tokio::test]
async fn compaction_prunes_beyond_retention_window() {
  let s = store().await;
  let tag = s.resolve_or_create_tag("alpha", d("2024-01-01")).await.unwrap();

  // One visit well past the retention window, one inside it.
  visit_n(&s, tag.tag_id, "2024-01-03T08:00:00", 1).await;
  visit_n(&s, tag.tag_id, "2024-02-25T08:00:00", 1).await;

  let today = d("2024-03-01");
  s.compact_tag(tag.tag_id, today).await.unwrap();

  // Both days are aggregated, each exactly once.
  let stats = s.tag_stats(tag.tag_id, today).await.unwrap();
  assert_eq!(stats.total_hits, 2);

  // Raw rows survive only inside the trailing window.
  let series = s.daily_series(tag.tag_id, today, 365).await.unwrap();
  assert_eq!(series, vec![DailyCount { day: d("2024-02-25"), hits: 1 }]);
}

#[tokio::test]
async fn compaction_only_touches_its_tag() {
  let s = store().await;
  let alpha = s.resolve_or_create_tag("alpha", d("2024-01-01")).await.unwrap();
  let beta = s.resolve_or_create_tag("beta", d("2024-01-01")).await.unwrap();
  visit_n(&s, alpha.tag_id, "2024-01-01T09:00:00", 1).await;
  visit_n(&s, beta.tag_id, "2024-01-01T09:00:00", 1).await;

  s.compact_tag(alpha.tag_id, d("2024-01-02")).await.unwrap();

  let beta_after = s.find_tag("beta").await.unwrap().unwrap();
  assert_eq!(beta_after.last_compacted_on, Some(d("2024-01-01")));

  let series =
    s.daily_series(beta.tag_id, d("2024-01-02"), 30).await.unwrap();
  assert_eq!(series, vec![DailyCount { day: d("2024-01-01"), hits: 1 }]);
}

// ─── All-tags summary ────────────────────────────────────────────────────────

#[tokio::test]
async fn summary_orders_descending_by_total() {
  let s = store().await;
  let alpha = s.resolve_or_create_tag("alpha", d("2024-01-01")).await.unwrap();
  let beta = s.resolve_or_create_tag("beta", d("2024-01-01")).await.unwrap();
  s.resolve_or_create_tag("gamma", d("2024-01-01")).await.unwrap();

  // alpha: 3 aggregated + 2 today; beta: 2 today; gamma: nothing.
  visit_n(&s, alpha.tag_id, "2024-01-01T09:00:00", 3).await;
  s.compact_tag(alpha.tag_id, d("2024-01-02")).await.unwrap();
  visit_n(&s, alpha.tag_id, "2024-01-02T09:00:00", 2).await;
  visit_n(&s, beta.tag_id, "2024-01-02T09:00:00", 2).await;

  let summary = s.all_tags_summary(d("2024-01-02")).await.unwrap();
  let rows: Vec<(&str, u64, u64)> = summary
    .iter()
    .map(|t| (t.tag.as_str(), t.total_hits, t.today_hits))
    .collect();

  assert_eq!(rows, [
    ("alpha", 5, 2),
    ("beta", 2, 2),
    ("gamma", 0, 0),
  ]);
}

#[tokio::test]
async fn summary_breaks_ties_by_tag_name() {
  let s = store().await;
  let zed = s.resolve_or_create_tag("zed", d("2024-01-01")).await.unwrap();
  let ack = s.resolve_or_create_tag("ack", d("2024-01-01")).await.unwrap();
  visit_n(&s, zed.tag_id, "2024-01-01T09:00:00", 1).await;
  visit_n(&s, ack.tag_id, "2024-01-01T09:00:00", 1).await;

  let names: Vec<String> = s
    .all_tags_summary(d("2024-01-01"))
    .await
    .unwrap()
    .into_iter()
    .map(|t| t.tag)
    .collect();
  assert_eq!(names, ["ack", "zed"]);
}
