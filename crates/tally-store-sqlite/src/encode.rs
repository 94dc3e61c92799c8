//! Encoding helpers between chrono civil types and the TEXT columns they
//! are stored in.
//!
//! Dates are stored as `YYYY-MM-DD` and timestamps as
//! `YYYY-MM-DDTHH:MM:SS`, both in the service's civil offset. ISO field
//! order makes lexicographic comparison in SQL match chronological order,
//! which the date-bounded compaction queries rely on.

use chrono::{NaiveDate, NaiveDateTime};
use tally_core::stats::TagRecord;

use crate::{Error, Result};

pub const DATE_FMT: &str = "%Y-%m-%d";
pub const DATETIME_FMT: &str = "%Y-%m-%dT%H:%M:%S";

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FMT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FMT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── NaiveDateTime ───────────────────────────────────────────────────────────

pub fn encode_datetime(dt: NaiveDateTime) -> String {
  dt.format(DATETIME_FMT).to_string()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `tags` row.
pub struct RawTag {
  pub tag_id:            i64,
  pub tag:               String,
  pub last_compacted_on: Option<String>,
}

impl RawTag {
  pub fn into_record(self) -> Result<TagRecord> {
    Ok(TagRecord {
      tag_id:            self.tag_id,
      tag:               self.tag,
      last_compacted_on: self
        .last_compacted_on
        .as_deref()
        .map(decode_date)
        .transpose()?,
    })
  }
}
