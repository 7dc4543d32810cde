//! Feed & Search Routes
//!
//! Thin collaborators over the aggregation core: they describe which
//! sources a page needs and map a strict-source failure to a 5xx-class
//! response. Partial degradation of optional sources is invisible here;
//! a degraded section simply arrives empty.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::models::AggregateFeed;
use crate::services::aggregator::SourceSpec;
use crate::services::upstream::{coerce_to_list, normalize_card};
use crate::AppState;

#[derive(Deserialize, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
}

fn upstream_error(err: impl std::fmt::Display) -> (StatusCode, Json<serde_json::Value>) {
    tracing::error!("Upstream aggregate error: {}", err);
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({"error": format!("Upstream error: {}", err)})),
    )
}

/// GET /api/feed
///
/// Home aggregate. `vip`, `latest` and `trending` are essential; `foryou`
/// is supplementary and known to be flaky upstream, so its failure renders
/// as an empty section.
pub async fn get_feed(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let feed = state
        .aggregator
        .aggregate(vec![
            SourceSpec::strict("vip", "/vip"),
            SourceSpec::strict("latest", "/latest"),
            SourceSpec::strict("trending", "/trending"),
            SourceSpec::optional("foryou", "/foryou"),
        ])
        .await
        .map_err(upstream_error)?;

    Ok(Json(feed))
}

/// GET /api/search?q=
///
/// Search listing keyed as the `search` section. A blank query returns an
/// empty section without touching the upstream. Results are not a feed
/// listing, so no page cap applies.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let q = query.q.unwrap_or_default().trim().to_string();

    let mut feed = AggregateFeed::default();
    if q.is_empty() {
        feed.sections.insert("search".to_string(), Vec::new());
        return Ok(Json(feed));
    }

    let raw = state
        .aggregator
        .client()
        .fetch(&format!("/search?query={}", urlencoding::encode(&q)))
        .await
        .map_err(upstream_error)?;

    let cards = coerce_to_list(raw).iter().filter_map(normalize_card).collect();
    feed.sections.insert("search".to_string(), cards);

    Ok(Json(feed))
}

/// GET /api/populersearch
///
/// Suggestion terms, passed through un-normalized for the client shell.
pub async fn popular_search(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let raw = state
        .aggregator
        .client()
        .fetch("/populersearch")
        .await
        .map_err(upstream_error)?;

    Ok(Json(raw))
}
