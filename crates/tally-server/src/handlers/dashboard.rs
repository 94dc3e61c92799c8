//! `GET /dashboard` and `GET /dashboard/{tag}` — read-only HTML views.

use axum::{
  extract::{Path, State},
  response::Html,
};
use tally_core::store::VisitStore;

use crate::{AppState, error::ServerError, render};

/// `GET /dashboard` — every tag, descending by total.
pub async fn overview<S>(
  State(state): State<AppState<S>>,
) -> Result<Html<String>, ServerError>
where
  S: VisitStore + Clone + Send + Sync + 'static,
{
  let summaries = state.service.overview().await?;
  Ok(Html(render::html::overview(&summaries)))
}

/// `GET /dashboard/{tag}` — counters and the daily chart for one tag.
///
/// Never records a visit and never creates a tag; an unknown tag is a 404.
pub async fn tag_page<S>(
  State(state): State<AppState<S>>,
  Path(tag): Path<String>,
) -> Result<Html<String>, ServerError>
where
  S: VisitStore + Clone + Send + Sync + 'static,
{
  let report = state.service.report(&tag).await?.ok_or_else(|| {
    ServerError::NotFound(format!("tag {tag:?} is not registered"))
  })?;
  Ok(Html(render::html::tag_page(&report)))
}
