//! The numbers the accounting engine produces for rendering collaborators.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A registered tag row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
  pub tag_id:            i64,
  pub tag:               String,
  /// Civil date of the last completed compaction run. `None` for rows that
  /// predate compaction bookkeeping and have never been compacted.
  pub last_compacted_on: Option<NaiveDate>,
}

/// Visit count for one civil date, drawn from raw visit rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
  pub day:  NaiveDate,
  pub hits: u64,
}

/// Total and today counters for one tag.
///
/// `total_hits` is the sum of all daily aggregates plus today's raw rows;
/// today is never aggregated while it is still today, so nothing is counted
/// twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStats {
  pub total_hits: u64,
  pub today_hits: u64,
}

/// Everything the badge and dashboard need for one tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagReport {
  pub tag:          String,
  pub total_hits:   u64,
  pub today_hits:   u64,
  /// Sparse per-day counts for the chart window, ascending by date.
  pub daily_series: Vec<DailyCount>,
  /// Civil instant the report was produced — and, for a recording
  /// operation, the instant the visit was stamped with.
  pub recorded_at:  NaiveDateTime,
}

/// One row of the all-tags overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSummary {
  pub tag:        String,
  pub total_hits: u64,
  pub today_hits: u64,
}
