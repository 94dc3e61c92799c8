//! JSON endpoints for non-SVG consumers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/hits?tag=<tag>` | Records a visit, returns the full report |
//! | `GET`  | `/api/tags` | All-tags summary, descending by total |

use axum::{
  Json,
  extract::{Query, State},
  http::{HeaderValue, header},
  response::{IntoResponse, Response},
};
use serde::Deserialize;
use tally_core::{stats::TagSummary, store::VisitStore};

use crate::{AppState, error::ServerError};

#[derive(Debug, Deserialize)]
pub struct HitParams {
  pub tag: Option<String>,
}

/// `GET /api/hits?tag=<tag>` — the badge operation with a JSON body.
pub async fn hits<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<HitParams>,
) -> Result<Response, ServerError>
where
  S: VisitStore + Clone + Send + Sync + 'static,
{
  let tag = params.tag.as_deref().unwrap_or("");
  if tag.is_empty() {
    return Err(ServerError::MissingTag);
  }

  let report = state.service.hit(tag).await?;

  // Same caching contract as the badge: every fetch is a visit.
  let mut response = Json(report).into_response();
  response
    .headers_mut()
    .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
  response.headers_mut().insert(
    header::ACCESS_CONTROL_ALLOW_ORIGIN,
    HeaderValue::from_static("*"),
  );
  Ok(response)
}

/// `GET /api/tags`
pub async fn tags<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<TagSummary>>, ServerError>
where
  S: VisitStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.service.overview().await?))
}
