//! HTTP surface for tally.
//!
//! Exposes an axum [`Router`] serving the SVG visit badge, the HTML
//! dashboard, and a small JSON API, backed by any
//! [`VisitStore`](tally_core::store::VisitStore) through
//! [`VisitService`].

pub mod error;
pub mod handlers;
pub mod render;

pub use error::ServerError;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use serde::Deserialize;
use tally_core::{service::VisitService, store::VisitStore};
use tower_http::trace::TraceLayer;

use handlers::{api, badge, dashboard};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// `TALLY_*` environment. Every field has a default so the server runs
/// with no config file at all.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  /// Daily-series chart width; capped at the raw retention window.
  #[serde(default = "default_series_window_days")]
  pub series_window_days: u32,
}

fn default_host() -> String {
  "127.0.0.1".to_string()
}

fn default_port() -> u16 {
  8787
}

fn default_store_path() -> PathBuf {
  PathBuf::from("tally.db")
}

fn default_series_window_days() -> u32 {
  tally_core::civil::SERIES_WINDOW_DAYS
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               default_host(),
      port:               default_port(),
      store_path:         default_store_path(),
      series_window_days: default_series_window_days(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: VisitStore> {
  pub service: Arc<VisitService<S>>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the badge service.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: VisitStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/",                get(badge::handler::<S>))
    .route("/badge",           get(badge::handler::<S>))
    .route("/dashboard",       get(dashboard::overview::<S>))
    .route("/dashboard/{tag}", get(dashboard::tag_page::<S>))
    .route("/api/hits",        get(api::hits::<S>))
    .route("/api/tags",        get(api::tags::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
