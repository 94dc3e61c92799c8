//! HTML dashboard pages: the all-tags overview and the per-tag detail page.
//!
//! Templates are inline format strings; every caller-supplied string passes
//! through [`escape`] (or [`encode_segment`] for URL paths) before
//! interpolation.

use tally_core::stats::{DailyCount, TagReport, TagSummary};

/// Escape text for interpolation into HTML content or attribute values.
pub fn escape(s: &str) -> String {
  s.replace('&', "&amp;")
   .replace('<', "&lt;")
   .replace('>', "&gt;")
   .replace('"', "&quot;")
   .replace('\'', "&#39;")
}

/// Percent-encode one URL path segment. Everything outside the unreserved
/// set is encoded, so a tag containing `/`, `?`, `#`, or `%` still reaches
/// the single-segment tag route. The output is also HTML-safe as is.
pub fn encode_segment(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for b in s.bytes() {
    match b {
      b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
        out.push(b as char)
      }
      _ => out.push_str(&format!("%{b:02X}")),
    }
  }
  out
}

/// The `/dashboard` overview: one row per tag, in the order given
/// (descending by total).
pub fn overview(summaries: &[TagSummary]) -> String {
  if summaries.is_empty() {
    return page("tally", "<h1>tally</h1>\n<p>No tags recorded yet.</p>");
  }

  let mut rows = String::new();
  for summary in summaries {
    let tag = escape(&summary.tag);
    let href = encode_segment(&summary.tag);
    rows.push_str(&format!(
      "<tr><td><a href=\"/dashboard/{href}\">{tag}</a></td>\
       <td class=\"num\">{total}</td><td class=\"num\">{today}</td></tr>\n",
      total = summary.total_hits,
      today = summary.today_hits,
    ));
  }

  let body = format!(
    "<h1>tally</h1>\n<table>\n<tr><th>tag</th><th class=\"num\">total</th>\
     <th class=\"num\">today</th></tr>\n{rows}</table>"
  );
  page("tally", &body)
}

/// The `/dashboard/{tag}` detail page: counters plus the daily bar chart.
pub fn tag_page(report: &TagReport) -> String {
  let tag = escape(&report.tag);
  let body = format!(
    "<h1>{tag}</h1>\n\
     <p>{total} total / {today} today</p>\n\
     {chart}\n\
     <p><a href=\"/dashboard\">all tags</a></p>",
    total = report.total_hits,
    today = report.today_hits,
    chart = chart(&report.daily_series),
  );
  page(&format!("tally: {tag}"), &body)
}

/// Bars scaled against the busiest day in the window. `title` carries the
/// exact date and count for hover inspection.
fn chart(series: &[DailyCount]) -> String {
  let Some(max) = series.iter().map(|p| p.hits).max() else {
    return "<p>No raw visits in the chart window.</p>".to_string();
  };

  let mut bars = String::new();
  for point in series {
    let height = (point.hits * 96 / max).max(4);
    bars.push_str(&format!(
      "<div class=\"bar\" style=\"height:{height}px\" \
       title=\"{date}: {hits}\"></div>\n",
      date = point.day.format("%Y-%m-%d"),
      hits = point.hits,
    ));
  }
  format!("<div class=\"chart\">\n{bars}</div>")
}

fn page(title: &str, body: &str) -> String {
  format!(
    r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  body {{ font-family: Arial, sans-serif; max-width: 40em; margin: 2em auto; color: #333; }}
  table {{ border-collapse: collapse; width: 100%; }}
  th, td {{ text-align: left; padding: 0.4em 0.8em; border-bottom: 1px solid #e6e6e6; }}
  .num {{ text-align: right; }}
  .chart {{ display: flex; align-items: flex-end; gap: 2px; height: 100px; }}
  .bar {{ width: 12px; background: #d0d0d0; border: 1px solid #b0b0b0; }}
  a {{ color: #333; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#
  )
}
