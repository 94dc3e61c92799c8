//! The `VisitStore` trait — the seam between the accounting engine and the
//! durable storage collaborator.
//!
//! The trait is implemented by storage backends (e.g. `tally-store-sqlite`).
//! Higher layers (`tally-server`) depend on this abstraction, not on any
//! concrete backend. `today` is always passed in explicitly so backends hold
//! no clock state and tests control the civil date.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::{NaiveDate, NaiveDateTime};

use crate::stats::{DailyCount, TagRecord, TagStats, TagSummary};

/// Abstraction over the durable visit store.
///
/// Every operation is a single statement or a single transaction.
/// Correctness under concurrent callers relies on the backend's
/// unique-constraint and insert-or-ignore semantics, never on in-process
/// locks: "row already exists" is success, not failure.
pub trait VisitStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Tag registry ──────────────────────────────────────────────────────

  /// Look up a tag by exact string match. Returns `None` if never seen.
  fn find_tag<'a>(
    &'a self,
    tag: &'a str,
  ) -> impl Future<Output = Result<Option<TagRecord>, Self::Error>> + Send + 'a;

  /// Resolve a tag string to its row, creating it on first sight with
  /// `last_compacted_on = today` so a brand-new tag is not immediately
  /// subject to compaction.
  ///
  /// Concurrent creates of the same string must converge on one row:
  /// insert-or-ignore, then re-read the surviving row for its generated id.
  fn resolve_or_create_tag<'a>(
    &'a self,
    tag: &'a str,
    today: NaiveDate,
  ) -> impl Future<Output = Result<TagRecord, Self::Error>> + Send + 'a;

  /// Every registered tag, in registration order. Feeds the compaction
  /// sweep.
  fn list_tags(
    &self,
  ) -> impl Future<Output = Result<Vec<TagRecord>, Self::Error>> + Send + '_;

  // ── Visit recording ───────────────────────────────────────────────────

  /// Append one raw visit event. No dedup, no rate limiting: every call
  /// counts as one visit.
  fn record_visit(
    &self,
    tag_id: i64,
    at: NaiveDateTime,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Compaction ────────────────────────────────────────────────────────

  /// Fold every pre-`today` civil date of this tag into its daily
  /// aggregate, prune raw rows older than the retention window, and stamp
  /// `last_compacted_on = today` — all in one transaction.
  ///
  /// Idempotent: re-running for the same `(tag, today)` changes nothing.
  /// A failed run leaves `last_compacted_on` untouched so the next request
  /// retries.
  fn compact_tag(
    &self,
    tag_id: i64,
    today: NaiveDate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Stats reads ───────────────────────────────────────────────────────

  /// Total and today counters:
  /// `total = Σ daily aggregates + count(raw rows dated today)`.
  /// A tag with no recorded visits yields `(0, 0)`.
  fn tag_stats(
    &self,
    tag_id: i64,
    today: NaiveDate,
  ) -> impl Future<Output = Result<TagStats, Self::Error>> + Send + '_;

  /// Sparse ascending per-day counts from raw rows, covering civil dates in
  /// `(today - window_days, today]`.
  fn daily_series(
    &self,
    tag_id: i64,
    today: NaiveDate,
    window_days: u32,
  ) -> impl Future<Output = Result<Vec<DailyCount>, Self::Error>> + Send + '_;

  /// `(tag, total, today)` for every tag, descending by total (ties broken
  /// by tag name so the overview is stable).
  fn all_tags_summary(
    &self,
    today: NaiveDate,
  ) -> impl Future<Output = Result<Vec<TagSummary>, Self::Error>> + Send + '_;
}
