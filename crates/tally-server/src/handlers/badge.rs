//! `GET /` and `GET /badge` — the SVG badge, recording one visit per
//! request.

use axum::{
  body::Body,
  extract::{Query, State},
  http::{StatusCode, header},
  response::Response,
};
use serde::Deserialize;
use tally_core::store::VisitStore;

use crate::{AppState, error::ServerError, render};

#[derive(Debug, Deserialize)]
pub struct BadgeParams {
  pub tag: Option<String>,
}

/// `GET /?tag=<tag>` — record a visit, return the badge.
///
/// The counters also travel as `x-total-hits` / `x-today-hits` headers so
/// scripted callers need not parse the SVG, and `no-store` keeps proxies
/// from swallowing visits.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<BadgeParams>,
) -> Result<Response, ServerError>
where
  S: VisitStore + Clone + Send + Sync + 'static,
{
  let tag = params.tag.as_deref().unwrap_or("");
  if tag.is_empty() {
    return Err(ServerError::MissingTag);
  }

  let report = state.service.hit(tag).await?;
  let svg = render::svg::badge(report.total_hits, report.today_hits);

  Ok(
    Response::builder()
      .status(StatusCode::OK)
      .header(header::CONTENT_TYPE, "image/svg+xml")
      .header(header::CACHE_CONTROL, "no-store")
      .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
      .header("x-total-hits", report.total_hits.to_string())
      .header("x-today-hits", report.today_hits.to_string())
      .header(
        "x-record-time",
        report.recorded_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
      )
      .header("x-tag", header_safe(&report.tag))
      .body(Body::from(svg))
      .unwrap(),
  )
}

/// Clamp a tag to visible ASCII so it is always a legal header value.
fn header_safe(tag: &str) -> String {
  tag
    .chars()
    .map(|c| if (' '..='~').contains(&c) { c } else { '_' })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn header_safe_replaces_control_and_non_ascii() {
    assert_eq!(header_safe("plain-tag"), "plain-tag");
    assert_eq!(header_safe("tab\there"), "tab_here");
    assert_eq!(header_safe("caf\u{e9}"), "caf_");
  }
}
