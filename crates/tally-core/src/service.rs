//! [`VisitService`] — the per-request accounting pipeline over a
//! [`VisitStore`].
//!
//! One instance is shared by every request; it owns no mutable state beyond
//! the injected clock, so all consistency comes from the store. The pipeline
//! for a recorded visit is: resolve tag → compact if due → append visit →
//! read stats.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
  Error, Result,
  civil::{CivilClock, RAW_RETENTION_DAYS, SERIES_WINDOW_DAYS, compaction_due},
  stats::{TagRecord, TagReport, TagSummary},
  store::VisitStore,
};

/// The visit-accounting engine exposed to rendering collaborators.
pub struct VisitService<S> {
  store:       S,
  clock:       Arc<dyn CivilClock>,
  window_days: u32,
}

impl<S: VisitStore> VisitService<S> {
  pub fn new(store: S, clock: Arc<dyn CivilClock>) -> Self {
    Self { store, clock, window_days: SERIES_WINDOW_DAYS }
  }

  /// Override the daily-series window width used for reports.
  ///
  /// Widths past the raw retention window are clamped to it; raw rows
  /// older than that are already pruned and cannot feed the chart.
  pub fn with_window_days(mut self, days: u32) -> Self {
    self.window_days = days.min(RAW_RETENTION_DAYS as u32);
    self
  }

  /// Record one visit for `tag` and report its counters.
  ///
  /// Compaction runs first when it is due for this tag. A compaction
  /// failure is logged and swallowed: the visit is still recorded, and the
  /// unchanged `last_compacted_on` makes a later request retry.
  pub async fn hit(&self, tag: &str) -> Result<TagReport> {
    if tag.is_empty() {
      return Err(Error::EmptyTag);
    }

    let now = self.clock.now();
    let today = now.date();

    let record = self
      .store
      .resolve_or_create_tag(tag, today)
      .await
      .map_err(box_store)?;

    self.compact_if_due(&record, today).await;

    self
      .store
      .record_visit(record.tag_id, now)
      .await
      .map_err(box_store)?;

    let stats =
      self.store.tag_stats(record.tag_id, today).await.map_err(box_store)?;
    let series = self
      .store
      .daily_series(record.tag_id, today, self.window_days)
      .await
      .map_err(box_store)?;

    Ok(TagReport {
      tag:          record.tag,
      total_hits:   stats.total_hits,
      today_hits:   stats.today_hits,
      daily_series: series,
      recorded_at:  now,
    })
  }

  /// Report counters for an existing tag without recording a visit.
  ///
  /// Returns `None` for a tag never seen; never creates one. The idempotent
  /// compaction still runs when due so read-only dashboard totals match
  /// what the badge would show.
  pub async fn report(&self, tag: &str) -> Result<Option<TagReport>> {
    if tag.is_empty() {
      return Err(Error::EmptyTag);
    }

    let now = self.clock.now();
    let today = now.date();

    let Some(record) = self.store.find_tag(tag).await.map_err(box_store)?
    else {
      return Ok(None);
    };

    self.compact_if_due(&record, today).await;

    let stats =
      self.store.tag_stats(record.tag_id, today).await.map_err(box_store)?;
    let series = self
      .store
      .daily_series(record.tag_id, today, self.window_days)
      .await
      .map_err(box_store)?;

    Ok(Some(TagReport {
      tag:          record.tag,
      total_hits:   stats.total_hits,
      today_hits:   stats.today_hits,
      daily_series: series,
      recorded_at:  now,
    }))
  }

  /// The all-tags overview, descending by total.
  ///
  /// Aggregates may be up to a day stale for tags whose compaction has not
  /// run today; the next visit to such a tag (or a sweep) catches them up.
  pub async fn overview(&self) -> Result<Vec<TagSummary>> {
    let today = self.clock.today();
    self.store.all_tags_summary(today).await.map_err(box_store)
  }

  /// Run compaction for every tag that is due, skipping tags whose run
  /// fails. Returns the number of tags compacted.
  ///
  /// Usually compaction is triggered lazily by traffic; this is the entry
  /// point for an external scheduler when traffic alone is not enough.
  pub async fn sweep_compactions(&self) -> Result<usize> {
    let today = self.clock.today();
    let mut compacted = 0;

    for record in self.store.list_tags().await.map_err(box_store)? {
      if !compaction_due(record.last_compacted_on, today) {
        continue;
      }
      match self.store.compact_tag(record.tag_id, today).await {
        Ok(()) => compacted += 1,
        Err(e) => {
          tracing::warn!(tag = %record.tag, error = %e, "sweep: compaction failed");
        }
      }
    }

    Ok(compacted)
  }

  async fn compact_if_due(&self, record: &TagRecord, today: NaiveDate) {
    if !compaction_due(record.last_compacted_on, today) {
      return;
    }
    if let Err(e) = self.store.compact_tag(record.tag_id, today).await {
      tracing::warn!(
        tag = %record.tag,
        error = %e,
        "compaction failed; will retry on a later request"
      );
    }
  }
}

fn box_store<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
