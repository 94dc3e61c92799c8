//! Civil time for visit accounting.
//!
//! All counting happens in one fixed civil time zone (UTC+8, the zone the
//! badge has always counted in), so a "day" is unambiguous no matter where
//! the server runs. "Now" is always obtained through an injected
//! [`CivilClock`], which keeps day-boundary and compaction-trigger behavior
//! deterministic under test.

use std::sync::Mutex;

use chrono::{Days, FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// Fixed civil offset, in hours east of UTC, used for all visit accounting.
pub const CIVIL_OFFSET_HOURS: i32 = 8;

/// Days a raw visit row is retained after its civil date has been folded
/// into a daily aggregate. The trailing window exists only to serve the
/// daily-series chart; totals never read it.
pub const RAW_RETENTION_DAYS: u64 = 30;

/// Default width of the daily-series window, in civil days ending today.
/// Must not exceed [`RAW_RETENTION_DAYS`] or the chart would reach past the
/// pruned horizon.
pub const SERIES_WINDOW_DAYS: u32 = 30;

/// The service's civil zone as a chrono offset.
pub fn civil_offset() -> FixedOffset {
  FixedOffset::east_opt(CIVIL_OFFSET_HOURS * 3600).expect("offset in range")
}

/// Earliest civil date whose raw visit rows are retained, given `today`.
pub fn raw_retention_cutoff(today: NaiveDate) -> NaiveDate {
  today - Days::new(RAW_RETENTION_DAYS)
}

/// Whether compaction should run for a tag on `today`.
///
/// Due on the first request of each new civil day, and for tags that have
/// never been compacted (rows predating the `last_compacted_on` column).
pub fn compaction_due(
  last_compacted_on: Option<NaiveDate>,
  today: NaiveDate,
) -> bool {
  last_compacted_on != Some(today)
}

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Source of "now", already shifted into the service's civil zone.
pub trait CivilClock: Send + Sync {
  /// Current wall-clock time in the civil zone.
  fn now(&self) -> NaiveDateTime;

  /// Current civil date.
  fn today(&self) -> NaiveDate {
    self.now().date()
  }
}

/// Clock backed by the system's UTC time plus the fixed civil offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl CivilClock for SystemClock {
  fn now(&self) -> NaiveDateTime {
    Utc::now().with_timezone(&civil_offset()).naive_local()
  }
}

/// Manually-advanced clock for deterministic tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
  now: Mutex<NaiveDateTime>,
}

impl ManualClock {
  pub fn new(start: NaiveDateTime) -> Self {
    Self { now: Mutex::new(start) }
  }

  /// Replace the current instant.
  pub fn set(&self, instant: NaiveDateTime) {
    *self.now.lock().expect("clock lock") = instant;
  }

  /// Advance by whole civil days, preserving the time of day.
  pub fn advance_days(&self, days: u64) {
    let mut now = self.now.lock().expect("clock lock");
    *now = *now + Days::new(days);
  }
}

impl CivilClock for ManualClock {
  fn now(&self) -> NaiveDateTime {
    *self.now.lock().expect("clock lock")
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
